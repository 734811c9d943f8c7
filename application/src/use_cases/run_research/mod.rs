//! Run Research use case
//!
//! The driver loop around a [`SharedStateMachine`]. The machine only vetoes
//! illegal moves; this loop decides which legal move to request next:
//!
//! | Machine state        | Driver action                                     |
//! |----------------------|---------------------------------------------------|
//! | `idle`               | request `planning`                                |
//! | working state        | run its collaborator, apply the outcome, request  |
//! |                      | the signalled target or report the error          |
//! | `failed`             | restart from `planning` while restarts remain     |
//! | `completed`          | stop                                              |
//!
//! A guard rejection on the requested target is reported back into the
//! machine as a recoverable `gate_rejected` error, so the current state's
//! recovery policy decides whether to retry, step back or fail.

mod types;

pub use types::{RunResearchError, RunResearchOutput};

use crate::config::DriverParams;
use crate::machine::{MachineError, SharedStateMachine};
use crate::ports::collaborators::{Collaborators, PhaseOutcome, PhaseSignal};
use crate::ports::progress::{NoProgress, ResearchProgressNotifier};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use crate::use_cases::shared::check_cancelled;
use research_domain::{AgentError, AgentState, ContextPatch};
use serde_json::json;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error tag reported when a requested transition was blocked by its guard
pub const GATE_REJECTED: &str = "gate_rejected";

/// Consecutive collaborator runs in one state.
#[derive(Debug, Default)]
struct Attempts {
    state: Option<AgentState>,
    count: usize,
}

impl Attempts {
    fn next(&mut self, state: AgentState) -> usize {
        if self.state == Some(state) {
            self.count += 1;
        } else {
            self.state = Some(state);
            self.count = 1;
        }
        self.count
    }
}

/// Use case for driving one research run to `completed` or `failed`
#[derive(Clone)]
pub struct RunResearchUseCase {
    collaborators: Collaborators,
    params: DriverParams,
    cancellation_token: Option<CancellationToken>,
}

impl RunResearchUseCase {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            params: DriverParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: DriverParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &DriverParams {
        &self.params
    }

    pub async fn execute(
        &self,
        machine: &SharedStateMachine,
    ) -> Result<RunResearchOutput, RunResearchError> {
        self.execute_with_progress(machine, &NoProgress, &NoRunLogger)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        machine: &SharedStateMachine,
        progress: &dyn ResearchProgressNotifier,
        logger: &dyn RunLogger,
    ) -> Result<RunResearchOutput, RunResearchError> {
        check_cancelled(&self.cancellation_token)?;

        if machine.state() != AgentState::Idle {
            info!(state = %machine.state(), "Resetting state machine for a new run");
            machine.reset()?;
        }

        let started = Instant::now();
        let mut steps = 0;
        let mut restarts = 0;
        let mut attempts = Attempts::default();

        info!(
            max_steps = self.params.max_steps,
            max_restarts = self.params.max_restarts,
            "Starting research run"
        );
        logger.log(RunEvent::new(
            "run_started",
            json!({
                "max_steps": self.params.max_steps,
                "max_attempts_per_state": self.params.max_attempts_per_state,
                "max_restarts": self.params.max_restarts,
            }),
        ));

        loop {
            check_cancelled(&self.cancellation_token)?;

            let state = machine.state();
            if state == AgentState::Completed
                || (state == AgentState::Failed && restarts >= self.params.max_restarts)
            {
                break;
            }
            if steps >= self.params.max_steps {
                warn!(steps, state = %state, "Step limit reached");
                return Err(RunResearchError::StepLimitExceeded(self.params.max_steps));
            }
            steps += 1;

            if state.is_working() {
                self.run_phase(machine, state, &mut attempts, progress, logger)
                    .await?;
            } else {
                if state == AgentState::Failed {
                    restarts += 1;
                    info!(restart = restarts, "Restarting failed run from planning");
                    logger.log(RunEvent::new("run_restarted", json!({ "restart": restarts })));
                }
                attempts = Attempts::default();
                machine.try_transition(AgentState::Planning)?;
            }

            machine.update_context(ContextPatch::new().with_time_elapsed(started.elapsed()))?;

            let now = machine.state();
            if now != state {
                progress.on_state_change(now, &machine.context());
            }
        }

        let context = machine.context();
        let final_state = context.current_state;
        let success = final_state == AgentState::Completed;

        if success {
            info!(steps, restarts, results = context.results.len(), "Research run completed");
        } else {
            warn!(
                steps,
                restarts,
                errors = context.errors.len(),
                "Research run failed"
            );
        }
        progress.on_run_complete(final_state, &context);
        logger.log(RunEvent::new(
            "run_finished",
            json!({
                "state": final_state,
                "steps": steps,
                "restarts": restarts,
                "progress": context.progress,
                "results": context.results.len(),
                "errors": context.errors.len(),
                "elapsed_ms": context.time_elapsed.as_millis() as u64,
            }),
        ));

        Ok(RunResearchOutput {
            final_state,
            context,
            steps,
            restarts,
            success,
        })
    }

    /// Run the collaborator for `state` once and act on what it returned.
    async fn run_phase(
        &self,
        machine: &SharedStateMachine,
        state: AgentState,
        attempts: &mut Attempts,
        progress: &dyn ResearchProgressNotifier,
        logger: &dyn RunLogger,
    ) -> Result<(), RunResearchError> {
        let attempt = attempts.next(state);
        if attempt > self.params.max_attempts_per_state {
            let error = AgentError::fatal(format!(
                "gave up on {} after {} attempts",
                state, self.params.max_attempts_per_state
            ));
            warn!(state = %state, "Attempt budget exhausted");
            self.report_error(machine, state, error, progress, logger)?;
            return Ok(());
        }

        let Some(collaborator) = self.collaborators.for_state(state) else {
            let error = AgentError::fatal(format!("no collaborator for {}", state));
            self.report_error(machine, state, error, progress, logger)?;
            return Ok(());
        };

        debug!(state = %state, attempt, collaborator = collaborator.name(), "Running phase");
        progress.on_phase_start(state, attempt);
        logger.log(RunEvent::new(
            "phase_started",
            json!({ "state": state, "attempt": attempt, "collaborator": collaborator.name() }),
        ));

        let context = machine.context();
        let result = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(RunResearchError::Cancelled),
                    result = collaborator.run(&context) => result,
                }
            }
            None => collaborator.run(&context).await,
        };

        match result {
            Ok(outcome) => self.apply_outcome(machine, state, outcome, progress, logger),
            Err(error) => self.report_error(machine, state, error, progress, logger),
        }
    }

    fn apply_outcome(
        &self,
        machine: &SharedStateMachine,
        state: AgentState,
        outcome: PhaseOutcome,
        progress: &dyn ResearchProgressNotifier,
        logger: &dyn RunLogger,
    ) -> Result<(), RunResearchError> {
        progress.on_phase_outcome(state, &outcome);
        logger.log(RunEvent::new(
            "phase_outcome",
            json!({
                "state": state,
                "plan": outcome.plan.is_some(),
                "results": outcome.results.len(),
                "progress": outcome.progress,
                "quality": outcome.quality,
                "signal": outcome.signal,
            }),
        ));

        let PhaseOutcome {
            plan,
            results,
            progress: reported,
            quality,
            signal,
        } = outcome;

        let mut patch = ContextPatch::new();
        if let Some(plan) = plan {
            patch = patch.with_plan(plan);
        }
        if let Some(reported) = reported {
            patch = patch.with_progress(reported);
        }
        if !patch.is_empty() {
            machine.update_context(patch)?;
        }
        for result in results {
            machine.add_result(result)?;
        }
        if let Some(quality) = quality {
            machine.update_quality(quality)?;
        }

        let target = match signal {
            PhaseSignal::Advance => state.forward_target(),
            PhaseSignal::Revisit(target) => Some(target),
        };
        let Some(target) = target else {
            return Ok(());
        };

        match machine.try_transition(target) {
            Ok(()) => Ok(()),
            Err(MachineError::GuardRejected { from, to }) => {
                info!(from = %from, to = %to, "Transition blocked by its guard");
                progress.on_gate_rejected(from, to);
                logger.log(RunEvent::new(
                    "gate_rejected",
                    json!({ "from": from, "to": to }),
                ));
                let error = AgentError::other(
                    GATE_REJECTED,
                    format!("{} -> {} blocked by its guard", from, to),
                    true,
                );
                self.report_error(machine, state, error, progress, logger)
            }
            Err(MachineError::IllegalTransition { from, to }) => {
                let error =
                    AgentError::fatal(format!("collaborator requested {} -> {}", from, to));
                self.report_error(machine, state, error, progress, logger)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn report_error(
        &self,
        machine: &SharedStateMachine,
        state: AgentState,
        error: AgentError,
        progress: &dyn ResearchProgressNotifier,
        logger: &dyn RunLogger,
    ) -> Result<(), RunResearchError> {
        warn!(state = %state, error = %error, "Phase error");
        progress.on_collaborator_error(state, &error);
        logger.log(RunEvent::new(
            "phase_error",
            json!({ "state": state, "error": &error }),
        ));
        let next = machine.handle_error(error)?;
        if next != state {
            debug!(from = %state, to = %next, "Recovered by moving");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::StateMachine;
    use crate::ports::collaborators::Collaborator;
    use async_trait::async_trait;
    use research_domain::{
        DecisionContext, ErrorKind, QualityPatch, ResearchPlan, ResearchResult,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Returns queued responses, then advances forever.
    struct Fake {
        name: &'static str,
        responses: Mutex<VecDeque<Result<PhaseOutcome, AgentError>>>,
        calls: Mutex<usize>,
    }

    impl Fake {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(0),
            }
        }

        fn then(self, response: Result<PhaseOutcome, AgentError>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Collaborator for Fake {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _context: &DecisionContext) -> Result<PhaseOutcome, AgentError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(PhaseOutcome::advance()))
        }
    }

    struct Team {
        planner: Arc<Fake>,
        searcher: Arc<Fake>,
        scraper: Arc<Fake>,
        analyzer: Arc<Fake>,
        verifier: Arc<Fake>,
        compiler: Arc<Fake>,
    }

    impl Team {
        /// Collaborators that complete a run on the first try.
        fn happy() -> Self {
            Self {
                planner: Arc::new(Fake::new("planner").then(Ok(
                    PhaseOutcome::advance().with_plan(ResearchPlan::new("rust async")),
                ))),
                searcher: Arc::new(Fake::new("searcher").then(Ok(
                    PhaseOutcome::advance().with_result(ResearchResult::new("web", "tokio docs")),
                ))),
                scraper: Arc::new(Fake::new("scraper")),
                analyzer: Arc::new(Fake::new("analyzer").then(Ok(PhaseOutcome::advance()
                    .with_quality(QualityPatch::new().with_claim_verification(0.8))))),
                verifier: Arc::new(Fake::new("verifier")),
                compiler: Arc::new(Fake::new("compiler").then(Ok(
                    PhaseOutcome::advance().with_quality(QualityPatch::new().with_overall(0.9)),
                ))),
            }
        }

        fn collaborators(&self) -> Collaborators {
            Collaborators {
                planner: self.planner.clone(),
                searcher: self.searcher.clone(),
                scraper: self.scraper.clone(),
                analyzer: self.analyzer.clone(),
                verifier: self.verifier.clone(),
                compiler: self.compiler.clone(),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<AgentState>>,
        gates: Mutex<Vec<(AgentState, AgentState)>>,
        errors: Mutex<Vec<AgentState>>,
        finished: Mutex<Option<AgentState>>,
    }

    impl ResearchProgressNotifier for Recorder {
        fn on_state_change(&self, state: AgentState, _context: &DecisionContext) {
            self.states.lock().unwrap().push(state);
        }

        fn on_collaborator_error(&self, state: AgentState, _error: &AgentError) {
            self.errors.lock().unwrap().push(state);
        }

        fn on_gate_rejected(&self, from: AgentState, to: AgentState) {
            self.gates.lock().unwrap().push((from, to));
        }

        fn on_run_complete(&self, state: AgentState, _context: &DecisionContext) {
            *self.finished.lock().unwrap() = Some(state);
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<&'static str>>);

    impl RunLogger for Events {
        fn log(&self, event: RunEvent) {
            self.0.lock().unwrap().push(event.event_type);
        }
    }

    fn machine() -> SharedStateMachine {
        SharedStateMachine::new(StateMachine::new())
    }

    #[tokio::test]
    async fn test_happy_path_completes() {
        let team = Team::happy();
        let use_case = RunResearchUseCase::new(team.collaborators());
        let recorder = Recorder::default();
        let events = Events::default();

        let output = use_case
            .execute_with_progress(&machine(), &recorder, &events)
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.final_state, AgentState::Completed);
        assert_eq!(output.steps, 7);
        assert_eq!(output.restarts, 0);
        assert_eq!(output.context.progress, 100);
        assert_eq!(output.context.results.len(), 1);
        assert!(output.context.errors.is_empty());
        assert_eq!(
            *recorder.states.lock().unwrap(),
            vec![
                AgentState::Planning,
                AgentState::Searching,
                AgentState::Scraping,
                AgentState::Analyzing,
                AgentState::Verifying,
                AgentState::Compiling,
                AgentState::Completed,
            ]
        );
        assert_eq!(*recorder.finished.lock().unwrap(), Some(AgentState::Completed));

        let events = events.0.lock().unwrap();
        assert_eq!(events.first(), Some(&"run_started"));
        assert_eq!(events.last(), Some(&"run_finished"));
        assert_eq!(events.iter().filter(|e| **e == "phase_started").count(), 6);
    }

    #[tokio::test]
    async fn test_scraping_timeout_is_retried() {
        let mut team = Team::happy();
        team.scraper = Arc::new(
            Fake::new("scraper")
                .then(Err(AgentError::timeout("slow page")))
                .then(Ok(PhaseOutcome::advance())),
        );
        let use_case = RunResearchUseCase::new(team.collaborators());

        let output = use_case.execute(&machine()).await.unwrap();
        assert!(output.success);
        assert_eq!(team.scraper.calls(), 2);
        assert_eq!(output.context.errors.len(), 1);
        assert_eq!(output.context.errors[0].kind, ErrorKind::Timeout);
        assert_eq!(output.steps, 8);
    }

    #[tokio::test]
    async fn test_empty_search_exhausts_attempts_and_fails() {
        let mut team = Team::happy();
        team.searcher = Arc::new(Fake::new("searcher"));
        let use_case = RunResearchUseCase::new(team.collaborators());
        let recorder = Recorder::default();

        let output = use_case
            .execute_with_progress(&machine(), &recorder, &NoRunLogger)
            .await
            .unwrap();

        assert!(!output.success);
        assert_eq!(output.final_state, AgentState::Failed);
        assert_eq!(team.searcher.calls(), 3);
        assert_eq!(
            *recorder.gates.lock().unwrap(),
            vec![(AgentState::Searching, AgentState::Scraping); 3]
        );
        let kinds: Vec<_> = output.context.errors.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::from(GATE_REJECTED),
                ErrorKind::from(GATE_REJECTED),
                ErrorKind::from(GATE_REJECTED),
                ErrorKind::Unrecoverable,
            ]
        );
    }

    #[tokio::test]
    async fn test_low_quality_compile_fails() {
        let mut team = Team::happy();
        team.compiler = Arc::new(Fake::new("compiler").then(Ok(
            PhaseOutcome::advance().with_quality(QualityPatch::new().with_overall(0.65)),
        )));
        let use_case = RunResearchUseCase::new(team.collaborators());

        let output = use_case.execute(&machine()).await.unwrap();
        assert_eq!(output.final_state, AgentState::Failed);
        assert_eq!(
            output.context.last_error().map(|e| e.kind.clone()),
            Some(ErrorKind::from(GATE_REJECTED))
        );
    }

    #[tokio::test]
    async fn test_revisit_steps_back() {
        let mut team = Team::happy();
        team.analyzer = Arc::new(
            Fake::new("analyzer")
                .then(Ok(PhaseOutcome::revisit(AgentState::Scraping)))
                .then(Ok(PhaseOutcome::advance()
                    .with_quality(QualityPatch::new().with_claim_verification(0.7)))),
        );
        let use_case = RunResearchUseCase::new(team.collaborators());
        let recorder = Recorder::default();

        let output = use_case
            .execute_with_progress(&machine(), &recorder, &NoRunLogger)
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(team.scraper.calls(), 2);
        let states = recorder.states.lock().unwrap();
        assert_eq!(
            states[2..6],
            [
                AgentState::Scraping,
                AgentState::Analyzing,
                AgentState::Scraping,
                AgentState::Analyzing
            ]
        );
    }

    #[tokio::test]
    async fn test_illegal_revisit_is_reported_as_fatal() {
        let mut team = Team::happy();
        team.verifier =
            Arc::new(Fake::new("verifier").then(Ok(PhaseOutcome::revisit(AgentState::Idle))));
        let use_case = RunResearchUseCase::new(team.collaborators());

        let output = use_case.execute(&machine()).await.unwrap();
        // verifying tolerates fatal errors by moving on to compiling
        assert!(output.success);
        assert_eq!(output.context.errors.len(), 1);
        assert!(!output.context.errors[0].recoverable);
    }

    fn flaky_planner_team() -> Team {
        let mut team = Team::happy();
        team.planner = Arc::new(
            Fake::new("planner")
                .then(Err(AgentError::fatal("model unavailable")))
                .then(Ok(PhaseOutcome::advance().with_plan(ResearchPlan::new("retry")))),
        );
        team
    }

    #[tokio::test]
    async fn test_failed_run_stops_without_restarts() {
        let team = flaky_planner_team();
        let output = RunResearchUseCase::new(team.collaborators())
            .execute(&machine())
            .await
            .unwrap();
        assert_eq!(output.final_state, AgentState::Failed);
        assert_eq!(output.restarts, 0);
        assert_eq!(team.planner.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_run_restarts_from_planning() {
        let team = flaky_planner_team();
        let output = RunResearchUseCase::new(team.collaborators())
            .with_params(DriverParams::default().with_max_restarts(1))
            .execute(&machine())
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.restarts, 1);
        assert_eq!(output.context.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_step_limit() {
        let team = Team::happy();
        let use_case = RunResearchUseCase::new(team.collaborators())
            .with_params(DriverParams::default().with_max_steps(3));

        let err = use_case.execute(&machine()).await.unwrap_err();
        assert!(matches!(err, RunResearchError::StepLimitExceeded(3)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let team = Team::happy();
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunResearchUseCase::new(team.collaborators()).with_cancellation(token);

        let err = use_case.execute(&machine()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(team.planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_finished_machine_is_reset_first() {
        let shared = machine();
        let team = Team::happy();
        RunResearchUseCase::new(team.collaborators())
            .execute(&shared)
            .await
            .unwrap();
        assert_eq!(shared.state(), AgentState::Completed);

        let team = Team::happy();
        let output = RunResearchUseCase::new(team.collaborators())
            .execute(&shared)
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.context.results.len(), 1);
    }

    #[tokio::test]
    async fn test_elapsed_time_is_tracked() {
        let team = Team::happy();
        let shared = machine();
        let ticks = Arc::new(Mutex::new(0usize));
        let ticks_in = Arc::clone(&ticks);
        let _sub = shared.subscribe(move |_, _| *ticks_in.lock().unwrap() += 1);

        let output = RunResearchUseCase::new(team.collaborators())
            .execute(&shared)
            .await
            .unwrap();
        assert!(output.context.time_elapsed > std::time::Duration::ZERO);
        assert!(*ticks.lock().unwrap() >= output.steps);
    }
}
