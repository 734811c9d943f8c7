//! Driver configuration from TOML (`[driver]` section)

use research_application::DriverParams;
use research_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Raw driver loop limits from TOML
///
/// # Example
///
/// ```toml
/// [driver]
/// max_steps = 200
/// max_attempts_per_state = 3
/// max_restarts = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDriverConfig {
    pub max_steps: usize,
    pub max_attempts_per_state: usize,
    pub max_restarts: usize,
}

impl Default for FileDriverConfig {
    fn default() -> Self {
        let params = DriverParams::default();
        Self {
            max_steps: params.max_steps,
            max_attempts_per_state: params.max_attempts_per_state,
            max_restarts: params.max_restarts,
        }
    }
}

impl FileDriverConfig {
    /// Convert to [`DriverParams`]. Zero budgets would stop every run
    /// before it starts, so they fall back to the defaults.
    pub fn to_params(&self) -> (DriverParams, Vec<ConfigIssue>) {
        let defaults = DriverParams::default();
        let mut issues = Vec::new();

        let max_steps = if self.max_steps == 0 {
            issues.push(ConfigIssue::error(
                "driver.max_steps",
                format!("must be at least 1, using {}", defaults.max_steps),
            ));
            defaults.max_steps
        } else {
            self.max_steps
        };

        let max_attempts_per_state = if self.max_attempts_per_state == 0 {
            issues.push(ConfigIssue::error(
                "driver.max_attempts_per_state",
                format!("must be at least 1, using {}", defaults.max_attempts_per_state),
            ));
            defaults.max_attempts_per_state
        } else {
            self.max_attempts_per_state
        };

        let params = DriverParams {
            max_steps,
            max_attempts_per_state,
            max_restarts: self.max_restarts,
        };
        (params, issues)
    }
}
