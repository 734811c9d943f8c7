//! State machine error types

use research_domain::AgentState;
use thiserror::Error;

/// Why a request to the state machine was refused.
///
/// A refused request never mutates the machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: AgentState, to: AgentState },

    #[error("Transition {from} -> {to} rejected by its guard")]
    GuardRejected { from: AgentState, to: AgentState },

    #[error("State machine re-entered from an observer callback")]
    Reentrant,
}
