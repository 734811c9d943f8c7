//! Type definitions for the RunResearch use case.

use crate::machine::MachineError;
use research_domain::{AgentState, DecisionContext};
use serde::Serialize;
use thiserror::Error;

/// Errors that stop the driver before the run reached a final state
#[derive(Error, Debug)]
pub enum RunResearchError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("State machine error: {0}")]
    Machine(#[from] MachineError),
}

impl RunResearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunResearchError::Cancelled)
    }
}

/// Output from the RunResearch use case
#[derive(Debug, Clone, Serialize)]
pub struct RunResearchOutput {
    /// `completed` or `failed`
    pub final_state: AgentState,
    /// Context at the end of the run
    pub context: DecisionContext,
    /// Driver loop iterations
    pub steps: usize,
    /// Times the run was restarted from `failed`
    pub restarts: usize,
    /// Whether the run completed
    pub success: bool,
}
