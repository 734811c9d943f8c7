//! Collaborator that replays scripted responses.

use super::ScenarioStep;
use async_trait::async_trait;
use research_application::{Collaborator, PhaseOutcome};
use research_domain::{AgentError, AgentState, DecisionContext};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Replays the scenario steps scripted for one working state.
pub struct ScriptedCollaborator {
    name: String,
    queue: Mutex<VecDeque<ScenarioStep>>,
}

impl ScriptedCollaborator {
    pub fn new(state: AgentState, steps: Vec<ScenarioStep>) -> Self {
        Self {
            name: format!("scripted-{}", role(state)),
            queue: Mutex::new(steps.into()),
        }
    }

    /// A poisoned queue is still the script; never skip it.
    fn next_step(&self) -> Option<ScenarioStep> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl Collaborator for ScriptedCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, context: &DecisionContext) -> Result<PhaseOutcome, AgentError> {
        let Some(step) = self.next_step() else {
            debug!(collaborator = %self.name, "Script exhausted, advancing");
            return Ok(PhaseOutcome::advance());
        };

        if step.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
        }
        debug!(
            collaborator = %self.name,
            progress = context.progress,
            failing = step.error.is_some(),
            "Replaying scripted step"
        );
        step.into_response()
    }
}

/// Collaborator role for a working state
fn role(state: AgentState) -> &'static str {
    match state {
        AgentState::Planning => "planner",
        AgentState::Searching => "searcher",
        AgentState::Scraping => "scraper",
        AgentState::Analyzing => "analyzer",
        AgentState::Verifying => "verifier",
        AgentState::Compiling => "compiler",
        AgentState::Idle | AgentState::Completed | AgentState::Failed => "observer",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_application::PhaseSignal;

    #[tokio::test]
    async fn test_replays_in_order_then_advances() {
        let collaborator = ScriptedCollaborator::new(
            AgentState::Scraping,
            vec![
                ScenarioStep::new(AgentState::Scraping).with_error(AgentError::timeout("slow")),
                ScenarioStep::new(AgentState::Scraping).with_progress(40),
            ],
        );
        assert_eq!(collaborator.name(), "scripted-scraper");

        let context = DecisionContext::new();
        assert!(collaborator.run(&context).await.is_err());
        assert_eq!(collaborator.run(&context).await.unwrap().progress, Some(40));

        let exhausted = collaborator.run(&context).await.unwrap();
        assert_eq!(exhausted, PhaseOutcome::advance());
        assert_eq!(exhausted.signal, PhaseSignal::Advance);
        assert_eq!(collaborator.run(&context).await.unwrap(), PhaseOutcome::advance());
    }

    #[tokio::test]
    async fn test_poisoned_queue_still_replays_script() {
        let collaborator = ScriptedCollaborator::new(
            AgentState::Searching,
            vec![ScenarioStep::new(AgentState::Searching).with_error(AgentError::fatal("down"))],
        );
        std::thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _queue = collaborator.queue.lock().unwrap();
                panic!("poison the script queue");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(collaborator.queue.is_poisoned());

        let error = collaborator.run(&DecisionContext::new()).await.unwrap_err();
        assert!(!error.recoverable);
        assert_eq!(
            collaborator.run(&DecisionContext::new()).await.unwrap(),
            PhaseOutcome::advance()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_simulated() {
        let collaborator = ScriptedCollaborator::new(
            AgentState::Planning,
            vec![ScenarioStep::new(AgentState::Planning).with_delay_ms(2_000)],
        );
        let started = tokio::time::Instant::now();
        collaborator.run(&DecisionContext::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2_000));
    }
}
