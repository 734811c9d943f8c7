//! Collaborator port - the components that do the actual research work.
//!
//! One [`Collaborator`] runs per working state (planner, searcher, scraper,
//! analyzer, verifier, compiler). It receives a snapshot of the decision
//! context and returns a [`PhaseOutcome`] describing what it produced and
//! where the driver should go next, or an [`AgentError`] classifying what
//! went wrong.

use async_trait::async_trait;
use research_domain::{
    AgentError, AgentState, DecisionContext, QualityPatch, ResearchPlan, ResearchResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the driver should head after a phase succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum PhaseSignal {
    /// Move to the next state of the pipeline
    #[default]
    Advance,
    /// Request a specific target, e.g. back to `searching` for more sources
    Revisit(AgentState),
}

/// What a collaborator produced in one run of its phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseOutcome {
    pub plan: Option<ResearchPlan>,
    pub results: Vec<ResearchResult>,
    pub progress: Option<u8>,
    pub quality: Option<QualityPatch>,
    pub signal: PhaseSignal,
}

impl PhaseOutcome {
    pub fn advance() -> Self {
        Self::default()
    }

    pub fn revisit(target: AgentState) -> Self {
        Self {
            signal: PhaseSignal::Revisit(target),
            ..Self::default()
        }
    }

    pub fn with_plan(mut self, plan: ResearchPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_result(mut self, result: ResearchResult) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_quality(mut self, quality: QualityPatch) -> Self {
        self.quality = Some(quality);
        self
    }
}

#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn run(&self, context: &DecisionContext) -> Result<PhaseOutcome, AgentError>;
}

/// The six collaborators of a research run, one per working state.
#[derive(Clone)]
pub struct Collaborators {
    pub planner: Arc<dyn Collaborator>,
    pub searcher: Arc<dyn Collaborator>,
    pub scraper: Arc<dyn Collaborator>,
    pub analyzer: Arc<dyn Collaborator>,
    pub verifier: Arc<dyn Collaborator>,
    pub compiler: Arc<dyn Collaborator>,
}

impl Collaborators {
    /// The collaborator responsible for `state`, if it is a working state.
    pub fn for_state(&self, state: AgentState) -> Option<&Arc<dyn Collaborator>> {
        match state {
            AgentState::Planning => Some(&self.planner),
            AgentState::Searching => Some(&self.searcher),
            AgentState::Scraping => Some(&self.scraper),
            AgentState::Analyzing => Some(&self.analyzer),
            AgentState::Verifying => Some(&self.verifier),
            AgentState::Compiling => Some(&self.compiler),
            AgentState::Idle | AgentState::Completed | AgentState::Failed => None,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("planner", &self.planner.name())
            .field("searcher", &self.searcher.name())
            .field("scraper", &self.scraper.name())
            .field("analyzer", &self.analyzer.name())
            .field("verifier", &self.verifier.name())
            .field("compiler", &self.compiler.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Collaborator for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _context: &DecisionContext) -> Result<PhaseOutcome, AgentError> {
            Ok(PhaseOutcome::advance())
        }
    }

    #[test]
    fn test_for_state_covers_working_states_only() {
        let stub: Arc<dyn Collaborator> = Arc::new(Named("stub"));
        let collaborators = Collaborators {
            planner: Arc::clone(&stub),
            searcher: Arc::clone(&stub),
            scraper: Arc::clone(&stub),
            analyzer: Arc::clone(&stub),
            verifier: Arc::clone(&stub),
            compiler: stub,
        };
        for state in AgentState::ALL {
            assert_eq!(
                collaborators.for_state(state).is_some(),
                state.is_working(),
                "{}",
                state
            );
        }
    }

    #[test]
    fn test_outcome_builders() {
        let outcome = PhaseOutcome::revisit(AgentState::Searching)
            .with_progress(40)
            .with_quality(QualityPatch::new().with_overall(0.5));
        assert_eq!(outcome.signal, PhaseSignal::Revisit(AgentState::Searching));
        assert_eq!(outcome.progress, Some(40));
        assert!(outcome.plan.is_none());
        assert_eq!(PhaseOutcome::advance().signal, PhaseSignal::Advance);
    }
}
