//! State handlers - per-state hooks run by the state machine.
//!
//! A [`StateHandler`] reacts to entering and leaving its state and decides
//! where an error reported in that state should take the run. All hooks have
//! no-op defaults.

use super::entities::AgentState;
use super::policy::RecoveryPolicy;
use super::value_objects::AgentError;
use crate::context::entities::DecisionContext;
use crate::transition::gates::GateThresholds;
use std::collections::HashMap;

pub trait StateHandler: Send + Sync {
    /// Called after the machine has moved into the handler's state
    fn on_enter(&self, _context: &mut DecisionContext) {}

    /// Called before the machine leaves the handler's state
    fn on_exit(&self, _context: &mut DecisionContext) {}

    /// Where to go after `error` was recorded in this state.
    ///
    /// `None` means the state has no policy for it.
    fn on_error(&self, _error: &AgentError, _context: &DecisionContext) -> Option<AgentState> {
        None
    }
}

/// Built-in handler for one research phase.
///
/// - entering `Idle` installs a fresh context
/// - entering any other state ratchets progress up to the state's floor
/// - errors are routed through [`RecoveryPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct PhaseHandler {
    state: AgentState,
    policy: RecoveryPolicy,
}

impl PhaseHandler {
    pub fn new(state: AgentState, policy: RecoveryPolicy) -> Self {
        Self { state, policy }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }
}

impl StateHandler for PhaseHandler {
    fn on_enter(&self, context: &mut DecisionContext) {
        if self.state == AgentState::Idle {
            *context = DecisionContext::new();
            return;
        }
        if let Some(floor) = self.state.progress_floor() {
            context.ratchet_progress(floor);
        }
    }

    fn on_error(&self, error: &AgentError, context: &DecisionContext) -> Option<AgentState> {
        self.policy.target(self.state, error, context)
    }
}

/// Handlers keyed by state. A state may have no handler at all.
#[derive(Default)]
pub struct HandlerSet {
    handlers: HashMap<AgentState, Box<dyn StateHandler>>,
}

impl HandlerSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A [`PhaseHandler`] for every state, with default gates.
    pub fn canonical() -> Self {
        Self::with_gates(&GateThresholds::default())
    }

    /// A [`PhaseHandler`] for every state, with the planning error limit
    /// taken from `gates`.
    pub fn with_gates(gates: &GateThresholds) -> Self {
        let policy = RecoveryPolicy::from_gates(gates);
        let mut set = Self::empty();
        for state in AgentState::ALL {
            set.register(state, PhaseHandler::new(state, policy));
        }
        set
    }

    /// Install `handler` for `state`, returning the one it replaces.
    pub fn register(
        &mut self,
        state: AgentState,
        handler: impl StateHandler + 'static,
    ) -> Option<Box<dyn StateHandler>> {
        self.handlers.insert(state, Box::new(handler))
    }

    pub fn remove(&mut self, state: AgentState) -> Option<Box<dyn StateHandler>> {
        self.handlers.remove(&state)
    }

    pub fn get(&self, state: AgentState) -> Option<&dyn StateHandler> {
        self.handlers.get(&state).map(|h| h.as_ref())
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut states: Vec<_> = self.handlers.keys().copied().collect();
        states.sort();
        f.debug_struct("HandlerSet").field("states", &states).finish()
    }
}
