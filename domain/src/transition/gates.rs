//! Gate thresholds used by the guarded transitions.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Numeric limits read by transition guards and the planning error policy.
///
/// The defaults reproduce the canonical table:
///
/// | Gate                         | Default |
/// |------------------------------|---------|
/// | scraping → analyzing         | progress >= 30 |
/// | analyzing → verifying        | progress >= 50 |
/// | verifying → compiling        | claim_verification >= 0.6 |
/// | compiling → completed        | overall >= 0.7 |
/// | planning → failed            | errors > 3 |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    pub min_scrape_progress: u8,
    pub min_analysis_progress: u8,
    pub min_claim_verification: f64,
    pub min_overall_quality: f64,
    /// Planning fails for good once more errors than this are recorded
    pub max_planning_errors: usize,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_scrape_progress: 30,
            min_analysis_progress: 50,
            min_claim_verification: 0.6,
            min_overall_quality: 0.7,
            max_planning_errors: 3,
        }
    }
}

impl GateThresholds {
    pub fn with_min_overall_quality(mut self, value: f64) -> Self {
        self.min_overall_quality = value;
        self
    }

    pub fn with_min_claim_verification(mut self, value: f64) -> Self {
        self.min_claim_verification = value;
        self
    }

    pub fn with_max_planning_errors(mut self, value: usize) -> Self {
        self.max_planning_errors = value;
        self
    }

    /// Replace every out-of-range gate with its default and report it.
    ///
    /// Score gates must lie in `[0, 1]`, progress gates in `0..=100`.
    pub fn sanitized(mut self) -> (Self, Vec<DomainError>) {
        let defaults = Self::default();
        let mut rejected = Vec::new();

        let scores = [
            (
                "min_claim_verification",
                &mut self.min_claim_verification,
                defaults.min_claim_verification,
            ),
            (
                "min_overall_quality",
                &mut self.min_overall_quality,
                defaults.min_overall_quality,
            ),
        ];
        for (field, value, fallback) in scores {
            if !(value.is_finite() && (0.0..=1.0).contains(&*value)) {
                rejected.push(DomainError::InvalidThreshold { field, value: *value });
                *value = fallback;
            }
        }

        let progress = [
            (
                "min_scrape_progress",
                &mut self.min_scrape_progress,
                defaults.min_scrape_progress,
            ),
            (
                "min_analysis_progress",
                &mut self.min_analysis_progress,
                defaults.min_analysis_progress,
            ),
        ];
        for (field, value, fallback) in progress {
            if *value > 100 {
                rejected.push(DomainError::InvalidThreshold {
                    field,
                    value: f64::from(*value),
                });
                *value = fallback;
            }
        }

        (self, rejected)
    }
}
