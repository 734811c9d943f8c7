//! Quality score data contract.
//!
//! [`QualityScore`] is written only by collaborators (through a
//! [`QualityPatch`]) and read by transition gates. Nothing in the domain
//! computes a score.

use serde::{Deserialize, Serialize};

/// Composite quality metrics, each intended to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityScore {
    pub overall: f64,
    pub accuracy: f64,
    pub completeness: f64,
    pub freshness: f64,
    pub source_quality: f64,
    pub claim_verification: f64,
}

impl QualityScore {
    /// Field names paired with their values, in declaration order.
    pub fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("overall", self.overall),
            ("accuracy", self.accuracy),
            ("completeness", self.completeness),
            ("freshness", self.freshness),
            ("source_quality", self.source_quality),
            ("claim_verification", self.claim_verification),
        ]
    }

    /// Returns `true` when every metric is a finite value within `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        self.fields()
            .iter()
            .all(|(_, value)| value.is_finite() && (0.0..=1.0).contains(value))
    }

    /// Names of metrics outside `[0, 1]`.
    pub fn out_of_range(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|(_, value)| !(value.is_finite() && (0.0..=1.0).contains(value)))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Overwrite the metrics present in `patch`, leaving the others untouched.
    pub fn merge(&mut self, patch: &QualityPatch) {
        if let Some(v) = patch.overall {
            self.overall = v;
        }
        if let Some(v) = patch.accuracy {
            self.accuracy = v;
        }
        if let Some(v) = patch.completeness {
            self.completeness = v;
        }
        if let Some(v) = patch.freshness {
            self.freshness = v;
        }
        if let Some(v) = patch.source_quality {
            self.source_quality = v;
        }
        if let Some(v) = patch.claim_verification {
            self.claim_verification = v;
        }
    }
}

/// Partial update for a [`QualityScore`]; `None` fields are left as they are.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPatch {
    pub overall: Option<f64>,
    pub accuracy: Option<f64>,
    pub completeness: Option<f64>,
    pub freshness: Option<f64>,
    pub source_quality: Option<f64>,
    pub claim_verification: Option<f64>,
}

impl QualityPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overall(mut self, value: f64) -> Self {
        self.overall = Some(value);
        self
    }

    pub fn with_accuracy(mut self, value: f64) -> Self {
        self.accuracy = Some(value);
        self
    }

    pub fn with_completeness(mut self, value: f64) -> Self {
        self.completeness = Some(value);
        self
    }

    pub fn with_freshness(mut self, value: f64) -> Self {
        self.freshness = Some(value);
        self
    }

    pub fn with_source_quality(mut self, value: f64) -> Self {
        self.source_quality = Some(value);
        self
    }

    pub fn with_claim_verification(mut self, value: f64) -> Self {
        self.claim_verification = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let score = QualityScore::default();
        assert!(score.fields().iter().all(|(_, v)| *v == 0.0));
        assert!(score.is_normalized());
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut score = QualityScore {
            accuracy: 0.4,
            ..Default::default()
        };
        score.merge(&QualityPatch::new().with_overall(0.9).with_claim_verification(0.8));

        assert_eq!(score.overall, 0.9);
        assert_eq!(score.claim_verification, 0.8);
        assert_eq!(score.accuracy, 0.4);
        assert_eq!(score.freshness, 0.0);
    }

    #[test]
    fn test_out_of_range_is_reported_not_clamped() {
        let mut score = QualityScore::default();
        score.merge(&QualityPatch::new().with_overall(1.4).with_freshness(f64::NAN));

        assert_eq!(score.overall, 1.4);
        assert!(!score.is_normalized());
        assert_eq!(score.out_of_range(), vec!["overall", "freshness"]);
    }

    #[test]
    fn test_patch_deserializes_partially() {
        let patch: QualityPatch = toml::from_str("overall = 0.75").unwrap();
        assert_eq!(patch.overall, Some(0.75));
        assert!(patch.accuracy.is_none());
        assert!(!patch.is_empty());
        assert!(QualityPatch::default().is_empty());
    }
}
