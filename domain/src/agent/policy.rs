//! Per-state error recovery policy.
//!
//! | State      | rate_limit | timeout  | other recoverable | non-recoverable |
//! |------------|------------|----------|-------------------|-----------------|
//! | planning   | retry      | retry    | retry             | failed          |
//! | searching  | planning   | retry    | retry             | failed          |
//! | scraping   | searching  | retry    | searching         | failed          |
//! | analyzing  | retry      | retry    | retry             | failed          |
//! | verifying  | retry      | retry    | retry             | compiling       |
//! | compiling  | failed     | failed   | failed            | failed          |
//!
//! `rate_limit` in searching and `timeout` in scraping win regardless of the
//! recoverable flag. Planning additionally fails once the error log grows past
//! [`RecoveryPolicy::max_planning_errors`]. Idle, completed and failed have no
//! policy; [`RecoveryPolicy::fallback`] applies to them.

use super::entities::AgentState;
use super::value_objects::{AgentError, ErrorKind};
use crate::context::entities::DecisionContext;
use crate::transition::gates::GateThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    pub max_planning_errors: usize,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::from_gates(&GateThresholds::default())
    }
}

impl RecoveryPolicy {
    pub fn from_gates(gates: &GateThresholds) -> Self {
        Self {
            max_planning_errors: gates.max_planning_errors,
        }
    }

    /// Target for `error` reported while in `state`.
    ///
    /// `context` already contains `error`. Returns `None` for states without
    /// a policy. Returning `state` itself means "retry in place".
    pub fn target(
        &self,
        state: AgentState,
        error: &AgentError,
        context: &DecisionContext,
    ) -> Option<AgentState> {
        let target = match state {
            AgentState::Planning => {
                if context.errors.len() > self.max_planning_errors || !error.recoverable {
                    AgentState::Failed
                } else {
                    AgentState::Planning
                }
            }
            AgentState::Searching => match error.kind {
                ErrorKind::RateLimited => AgentState::Planning,
                ErrorKind::Timeout | ErrorKind::Unrecoverable | ErrorKind::Other(_) => {
                    Self::retry_or(state, error, AgentState::Failed)
                }
            },
            AgentState::Scraping => match error.kind {
                ErrorKind::Timeout => AgentState::Scraping,
                ErrorKind::RateLimited | ErrorKind::Unrecoverable | ErrorKind::Other(_) => {
                    if error.recoverable {
                        AgentState::Searching
                    } else {
                        AgentState::Failed
                    }
                }
            },
            AgentState::Analyzing => Self::retry_or(state, error, AgentState::Failed),
            AgentState::Verifying => Self::retry_or(state, error, AgentState::Compiling),
            AgentState::Compiling => AgentState::Failed,
            AgentState::Idle | AgentState::Completed | AgentState::Failed => return None,
        };
        Some(target)
    }

    /// Target for states without a policy: fail on non-recoverable errors,
    /// otherwise stay put.
    pub fn fallback(error: &AgentError) -> Option<AgentState> {
        (!error.recoverable).then_some(AgentState::Failed)
    }

    fn retry_or(state: AgentState, error: &AgentError, otherwise: AgentState) -> AgentState {
        if error.recoverable { state } else { otherwise }
    }
}
