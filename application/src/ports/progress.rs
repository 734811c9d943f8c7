//! Research progress port.
//!
//! [`ResearchProgressNotifier`] is an output port the presentation layer
//! implements to show a run as it happens. All methods have no-op defaults,
//! so implementers only override what they display.

use super::collaborators::PhaseOutcome;
use research_domain::{AgentError, AgentState, DecisionContext};

pub trait ResearchProgressNotifier: Send + Sync {
    /// Called after the machine moved to a new state
    fn on_state_change(&self, _state: AgentState, _context: &DecisionContext) {}

    /// Called before a collaborator runs. `attempt` starts at 1.
    fn on_phase_start(&self, _state: AgentState, _attempt: usize) {}

    /// Called when a collaborator returned an outcome
    fn on_phase_outcome(&self, _state: AgentState, _outcome: &PhaseOutcome) {}

    /// Called when a collaborator reported an error
    fn on_collaborator_error(&self, _state: AgentState, _error: &AgentError) {}

    /// Called when a requested transition was blocked by its guard
    fn on_gate_rejected(&self, _from: AgentState, _to: AgentState) {}

    /// Called once the run reached `completed` or gave up in `failed`
    fn on_run_complete(&self, _state: AgentState, _context: &DecisionContext) {}
}

/// No-op notifier for when progress reporting is not needed
pub struct NoProgress;

impl ResearchProgressNotifier for NoProgress {}
