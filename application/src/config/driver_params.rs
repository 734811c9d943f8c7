//! Driver parameters - research loop control.
//!
//! [`DriverParams`] bounds the loop in
//! [`RunResearchUseCase`](crate::use_cases::run_research::RunResearchUseCase).
//! These are application-layer concerns; the gates deciding whether a
//! transition is allowed live in the domain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverParams {
    /// Upper bound on loop iterations for one run.
    pub max_steps: usize,
    /// Consecutive collaborator runs allowed in one state before the driver
    /// reports a fatal error there.
    pub max_attempts_per_state: usize,
    /// How many times a failed run may be restarted from planning.
    pub max_restarts: usize,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            max_steps: 200,
            max_attempts_per_state: 3,
            max_restarts: 0,
        }
    }
}

impl DriverParams {
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_max_attempts_per_state(mut self, max: usize) -> Self {
        self.max_attempts_per_state = max;
        self
    }

    pub fn with_max_restarts(mut self, max: usize) -> Self {
        self.max_restarts = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DriverParams::default();
        assert_eq!(params.max_steps, 200);
        assert_eq!(params.max_attempts_per_state, 3);
        assert_eq!(params.max_restarts, 0);
    }

    #[test]
    fn test_builders() {
        let params = DriverParams::default()
            .with_max_steps(10)
            .with_max_attempts_per_state(1)
            .with_max_restarts(2);
        assert_eq!(
            params,
            DriverParams {
                max_steps: 10,
                max_attempts_per_state: 1,
                max_restarts: 2
            }
        );
    }
}
