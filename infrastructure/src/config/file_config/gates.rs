//! Gate configuration from TOML (`[gates]` section)

use research_domain::{ConfigIssue, DomainError, GateThresholds};
use serde::{Deserialize, Serialize};

/// Raw gate thresholds from TOML
///
/// # Example
///
/// ```toml
/// [gates]
/// min_scrape_progress = 30      # scraping -> analyzing
/// min_analysis_progress = 50    # analyzing -> verifying
/// min_claim_verification = 0.6  # verifying -> compiling
/// min_overall_quality = 0.7     # compiling -> completed
/// max_planning_errors = 3       # planning -> failed
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatesConfig {
    pub min_scrape_progress: u8,
    pub min_analysis_progress: u8,
    pub min_claim_verification: f64,
    pub min_overall_quality: f64,
    pub max_planning_errors: usize,
}

impl Default for FileGatesConfig {
    fn default() -> Self {
        let gates = GateThresholds::default();
        Self {
            min_scrape_progress: gates.min_scrape_progress,
            min_analysis_progress: gates.min_analysis_progress,
            min_claim_verification: gates.min_claim_verification,
            min_overall_quality: gates.min_overall_quality,
            max_planning_errors: gates.max_planning_errors,
        }
    }
}

impl FileGatesConfig {
    /// Convert to [`GateThresholds`]. Out-of-range values are replaced by
    /// their defaults and reported.
    pub fn to_thresholds(&self) -> (GateThresholds, Vec<ConfigIssue>) {
        let (gates, rejected) = GateThresholds {
            min_scrape_progress: self.min_scrape_progress,
            min_analysis_progress: self.min_analysis_progress,
            min_claim_verification: self.min_claim_verification,
            min_overall_quality: self.min_overall_quality,
            max_planning_errors: self.max_planning_errors,
        }
        .sanitized();

        let mut issues: Vec<ConfigIssue> = rejected
            .iter()
            .map(|error| match error {
                DomainError::InvalidThreshold { field, .. } => ConfigIssue::error(
                    format!("gates.{}", field),
                    format!("{}, using the default", error),
                ),
                other => ConfigIssue::error("gates", other.to_string()),
            })
            .collect();

        if gates.min_analysis_progress < gates.min_scrape_progress {
            issues.push(ConfigIssue::warning(
                "gates.min_analysis_progress",
                format!(
                    "{} is below min_scrape_progress ({}); the analysis gate will never bind",
                    gates.min_analysis_progress, gates.min_scrape_progress
                ),
            ));
        }

        (gates, issues)
    }
}
