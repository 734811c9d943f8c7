//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown agent state: {0}")]
    UnknownState(String),

    #[error("Invalid threshold for {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_display() {
        let error = DomainError::UnknownState("sleeping".to_string());
        assert_eq!(error.to_string(), "Unknown agent state: sleeping");
    }

    #[test]
    fn test_invalid_threshold_display() {
        let error = DomainError::InvalidThreshold {
            field: "min_overall_quality",
            value: 1.5,
        };
        assert_eq!(
            error.to_string(),
            "Invalid threshold for min_overall_quality: 1.5"
        );
    }
}
