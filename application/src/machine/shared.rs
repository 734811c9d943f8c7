//! Shared handle to a [`StateMachine`] with a reentrancy guard.
//!
//! Every call locks the machine for its duration, so requests are applied
//! one at a time. A listener that calls back into the handle while it is
//! being notified gets [`MachineError::Reentrant`] for anything that would
//! mutate the machine. Reading state and context from a listener returns
//! the snapshot being delivered.

use super::engine::StateMachine;
use super::error::MachineError;
use super::lock;
use super::observer::{DeliveryGuard, ObserverBus, Subscription};
use research_domain::{
    AgentError, AgentState, ContextPatch, DecisionContext, QualityPatch, ResearchResult,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub struct SharedStateMachine {
    inner: Arc<Mutex<StateMachine>>,
    observers: ObserverBus,
    guard: DeliveryGuard,
}

impl SharedStateMachine {
    pub fn new(machine: StateMachine) -> Self {
        let observers = machine.observers().clone();
        let guard = observers.delivery_guard();
        Self {
            inner: Arc::new(Mutex::new(machine)),
            observers,
            guard,
        }
    }

    fn machine(&self) -> Result<MutexGuard<'_, StateMachine>, MachineError> {
        if self.guard.is_delivering_here() {
            return Err(MachineError::Reentrant);
        }
        Ok(lock(&self.inner))
    }

    pub fn state(&self) -> AgentState {
        match self.guard.snapshot_here() {
            Some((state, _)) => state,
            None => lock(&self.inner).state(),
        }
    }

    pub fn context(&self) -> DecisionContext {
        match self.guard.snapshot_here() {
            Some((_, context)) => context,
            None => lock(&self.inner).context(),
        }
    }

    /// Run `f` against the locked machine.
    pub fn with<R>(&self, f: impl FnOnce(&StateMachine) -> R) -> Result<R, MachineError> {
        Ok(f(&*self.machine()?))
    }

    pub fn can_transition_to(&self, to: AgentState) -> Result<bool, MachineError> {
        self.with(|m| m.can_transition_to(to))
    }

    pub fn valid_transitions(&self) -> Result<Vec<AgentState>, MachineError> {
        self.with(|m| m.valid_transitions())
    }

    pub fn transition(&self, to: AgentState) -> bool {
        match self.try_transition(to) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    pub fn try_transition(&self, to: AgentState) -> Result<(), MachineError> {
        self.machine()?.try_transition(to)
    }

    pub fn handle_error(&self, error: AgentError) -> Result<AgentState, MachineError> {
        Ok(self.machine()?.handle_error(error))
    }

    pub fn update_context(&self, patch: ContextPatch) -> Result<(), MachineError> {
        self.machine()?.update_context(patch);
        Ok(())
    }

    pub fn update_quality(&self, patch: QualityPatch) -> Result<(), MachineError> {
        self.machine()?.update_quality(patch);
        Ok(())
    }

    pub fn add_result(&self, result: ResearchResult) -> Result<(), MachineError> {
        self.machine()?.add_result(result);
        Ok(())
    }

    pub fn reset(&self) -> Result<(), MachineError> {
        self.machine()?.reset();
        Ok(())
    }

    /// Subscribing never touches the machine lock, so it also works from
    /// inside a listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(AgentState, &DecisionContext) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }
}

impl std::fmt::Debug for SharedStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStateMachine")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_domain::ResearchPlan;

    #[test]
    fn test_listener_reentry_fails_fast() {
        let shared = SharedStateMachine::new(StateMachine::new());
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let handle = shared.clone();
        let outcomes_in = Arc::clone(&outcomes);
        let _sub = shared.subscribe(move |state, _| {
            if state == AgentState::Planning {
                outcomes_in.lock().unwrap().push((
                    handle.try_transition(AgentState::Failed),
                    handle.handle_error(AgentError::fatal("from listener")).err(),
                ));
            }
        });

        assert!(shared.transition(AgentState::Planning));
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(
            *outcomes,
            vec![(Err(MachineError::Reentrant), Some(MachineError::Reentrant))]
        );
        // The rejected calls left no trace.
        assert_eq!(shared.state(), AgentState::Planning);
        assert!(shared.context().errors.is_empty());
    }

    #[test]
    fn test_listener_reads_delivered_snapshot() {
        let shared = SharedStateMachine::new(StateMachine::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = shared.clone();
        let seen_in = Arc::clone(&seen);
        let _sub = shared.subscribe(move |state, context| {
            assert_eq!(handle.state(), state);
            assert_eq!(handle.context().progress, context.progress);
            assert_eq!(handle.can_transition_to(AgentState::Searching), Err(MachineError::Reentrant));
            seen_in.lock().unwrap().push(state);
        });

        assert!(shared.transition(AgentState::Planning));
        shared
            .update_context(ContextPatch::new().with_plan(ResearchPlan::new("q")))
            .unwrap();
        assert!(shared.transition(AgentState::Searching));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AgentState::Planning, AgentState::Planning, AgentState::Searching]
        );
    }

    #[test]
    fn test_calls_outside_delivery_succeed() {
        let shared = SharedStateMachine::new(StateMachine::new());
        assert_eq!(shared.valid_transitions().unwrap(), vec![AgentState::Planning]);
        assert!(shared.can_transition_to(AgentState::Planning).unwrap());
        assert_eq!(
            shared.try_transition(AgentState::Completed),
            Err(MachineError::IllegalTransition {
                from: AgentState::Idle,
                to: AgentState::Completed
            })
        );
        shared.try_transition(AgentState::Planning).unwrap();
        shared.reset().unwrap();
        assert_eq!(shared.state(), AgentState::Idle);
    }

    #[test]
    fn test_overlapping_deliveries_on_two_threads_leave_no_marker() {
        let shared = SharedStateMachine::new(StateMachine::new());
        let bus = shared.observers.clone();
        let _sub = shared.subscribe(|state, _| {
            if state == AgentState::Searching {
                std::thread::sleep(std::time::Duration::from_millis(300));
            }
        });

        let other_bus = bus.clone();
        let other = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(100));
            other_bus.notify(AgentState::Scraping, &DecisionContext::new());
        });
        bus.notify(AgentState::Searching, &DecisionContext::new());
        other.join().unwrap();

        assert!(!shared.guard.is_delivering_here());
        assert_eq!(shared.state(), AgentState::Idle);
        shared.try_transition(AgentState::Planning).unwrap();
        assert_eq!(shared.state(), AgentState::Planning);
    }

    #[test]
    fn test_other_threads_are_not_rejected() {
        let shared = SharedStateMachine::new(StateMachine::new());
        let handle = shared.clone();
        std::thread::spawn(move || handle.try_transition(AgentState::Planning))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(shared.state(), AgentState::Planning);
    }
}
