//! The research state machine.
//!
//! The current state lives only in `context.current_state`, so the state
//! reported by the machine and the state recorded in the context can never
//! diverge.

use super::error::MachineError;
use super::observer::{ObserverBus, Subscription};
use research_domain::{
    AgentError, AgentState, ContextPatch, DecisionContext, GateThresholds, HandlerSet,
    QualityPatch, RecoveryPolicy, ResearchResult, TransitionTable,
};
use tracing::{debug, info, warn};

pub struct StateMachine {
    context: DecisionContext,
    table: TransitionTable,
    handlers: HandlerSet,
    observers: ObserverBus,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Canonical table and handlers with default gates.
    pub fn new() -> Self {
        Self::with_gates(GateThresholds::default())
    }

    pub fn with_gates(gates: GateThresholds) -> Self {
        Self::from_parts(
            TransitionTable::with_gates(gates),
            HandlerSet::with_gates(&gates),
        )
    }

    pub fn from_parts(table: TransitionTable, handlers: HandlerSet) -> Self {
        Self {
            context: DecisionContext::new(),
            table,
            handlers,
            observers: ObserverBus::new(),
        }
    }

    // ==================== Introspection ====================

    pub fn state(&self) -> AgentState {
        self.context.current_state
    }

    /// A copy of the context. Changes to it do not reach the machine.
    pub fn context(&self) -> DecisionContext {
        self.context.clone()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub(crate) fn observers(&self) -> &ObserverBus {
        &self.observers
    }

    /// Whether `transition(to)` would succeed right now.
    pub fn can_transition_to(&self, to: AgentState) -> bool {
        self.table
            .find(self.state(), to)
            .is_some_and(|t| t.permits(&self.context))
    }

    /// Targets whose pair exists and whose guard currently holds, in table
    /// declaration order. More than one entry means the caller must choose.
    pub fn valid_transitions(&self) -> Vec<AgentState> {
        self.table
            .transitions_from(self.state())
            .filter(|t| t.permits(&self.context))
            .map(|t| t.to)
            .collect()
    }

    // ==================== Transitions ====================

    /// Request a move to `to`. Returns `false` and leaves the machine
    /// untouched if the pair is missing or its guard fails.
    pub fn transition(&mut self, to: AgentState) -> bool {
        match self.try_transition(to) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    pub fn try_transition(&mut self, to: AgentState) -> Result<(), MachineError> {
        let from = self.state();
        let Some(transition) = self.table.find(from, to) else {
            return Err(MachineError::IllegalTransition { from, to });
        };
        if !transition.permits(&self.context) {
            return Err(MachineError::GuardRejected { from, to });
        }
        self.enter(from, to);
        Ok(())
    }

    /// Record `error` and let the current state's handler route it.
    ///
    /// A target different from the current state is entered without
    /// checking its guard. Returns the state the machine ends up in.
    pub fn handle_error(&mut self, error: AgentError) -> AgentState {
        let current = self.state();
        self.context.errors.push(error.clone());

        let target = self
            .handlers
            .get(current)
            .and_then(|handler| handler.on_error(&error, &self.context))
            .or_else(|| RecoveryPolicy::fallback(&error));

        match target {
            Some(target) if target != current => {
                info!(
                    from = %current,
                    to = %target,
                    error = %error,
                    "Escaping after error"
                );
                self.enter(current, target);
            }
            _ => {
                debug!(state = %current, error = %error, "Error recorded, staying in state");
                self.notify();
            }
        }
        self.state()
    }

    fn enter(&mut self, from: AgentState, to: AgentState) {
        if let Some(handler) = self.handlers.get(from) {
            handler.on_exit(&mut self.context);
        }
        if let Some(transition) = self.table.find(from, to) {
            transition.run_action(&mut self.context);
        }
        self.context.current_state = to;
        if let Some(handler) = self.handlers.get(to) {
            handler.on_enter(&mut self.context);
        }
        // Hooks may replace the whole context.
        self.context.current_state = to;

        debug!(from = %from, to = %to, progress = self.context.progress, "State transition");
        self.notify();
    }

    // ==================== Mutators ====================

    pub fn update_context(&mut self, patch: ContextPatch) {
        patch.apply(&mut self.context);
        self.notify();
    }

    /// Merge quality metrics. Values are stored as given.
    pub fn update_quality(&mut self, patch: QualityPatch) {
        self.context.quality.merge(&patch);
        let out_of_range = self.context.quality.out_of_range();
        if !out_of_range.is_empty() {
            warn!(fields = ?out_of_range, "Quality metrics outside [0, 1]");
        }
        self.notify();
    }

    pub fn add_result(&mut self, result: ResearchResult) {
        self.context.results.push(result);
        self.notify();
    }

    /// Back to `idle` with a fresh context.
    pub fn reset(&mut self) {
        self.context = DecisionContext::new();
        debug!("State machine reset");
        self.notify();
    }

    // ==================== Observers ====================

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(AgentState, &DecisionContext) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }

    fn notify(&self) {
        self.observers.notify(self.state(), &self.context);
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state())
            .field("progress", &self.context.progress)
            .field("transitions", &self.table.len())
            .field("observers", &self.observers)
            .finish()
    }
}
