//! Raw TOML configuration data types
//!
//! These structs mirror the TOML config file. Each section converts to its
//! runtime type and reports anything it had to correct as a
//! [`ConfigIssue`].

mod driver;
mod gates;
mod logging;
mod output;

pub use driver::FileDriverConfig;
pub use gates::FileGatesConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use research_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Transition guard thresholds
    pub gates: FileGatesConfig,
    /// Driver loop limits
    pub driver: FileDriverConfig,
    /// Run transcript settings
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.gates.to_thresholds().1);
        issues.extend(self.driver.to_params().1);
        issues.extend(self.output.parse_format().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[gates]
min_overall_quality = 0.8
max_planning_errors = 5

[driver]
max_steps = 50
max_restarts = 1

[logging]
run_log = "runs/latest.jsonl"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (gates, _) = config.gates.to_thresholds();
        assert_eq!(gates.min_overall_quality, 0.8);
        assert_eq!(gates.max_planning_errors, 5);
        assert_eq!(gates.min_claim_verification, 0.6);

        let (params, _) = config.driver.to_params();
        assert_eq!(params.max_steps, 50);
        assert_eq!(params.max_restarts, 1);
        assert_eq!(params.max_attempts_per_state, 3);

        assert_eq!(config.logging.run_log.as_deref(), Some("runs/latest.jsonl"));
        assert_eq!(config.output.parse_format().0, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[driver]
max_attempts_per_state = 5
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.driver.max_attempts_per_state, 5);
        assert_eq!(config.gates, FileGatesConfig::default());
        assert!(config.output.show_progress);
        assert!(config.logging.run_log.is_none());
    }

    #[test]
    fn test_validate_collects_every_section() {
        let toml_str = r#"
[gates]
min_claim_verification = -0.2

[driver]
max_steps = 0

[output]
format = "yaml"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let fields: Vec<_> = config.validate().into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec!["gates.min_claim_verification", "driver.max_steps", "output.format"]
        );
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }
}
