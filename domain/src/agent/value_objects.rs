//! Agent domain value objects - errors reported into a research run.
//!
//! # Error classification
//! - [`ErrorKind`] - Closed classification tag set by the reporting collaborator
//! - [`AgentError`] - A reported failure (kind, message, recoverability)
//!
//! The recovery policy matches on [`ErrorKind`] exhaustively, so a new
//! classification must be handled everywhere before it compiles. Tags that
//! are not known yet travel as [`ErrorKind::Other`]; its [`OtherTag`] can
//! only be built through `From<String>`, so a known tag never lands there.

use serde::{Deserialize, Serialize};

/// Classification of a reported failure.
///
/// Serialized as a plain string tag (`"rate_limit"`, `"timeout"`,
/// `"unrecoverable"`, or any other tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorKind {
    /// Upstream throttled the request
    RateLimited,
    /// An operation exceeded its deadline
    Timeout,
    /// The reporter considers the failure terminal
    Unrecoverable,
    /// Any other classification tag
    Other(OtherTag),
}

/// Tag of an [`ErrorKind::Other`]. Never one of the known tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OtherTag(String);

impl OtherTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::RateLimited => "rate_limit",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unrecoverable => "unrecoverable",
            ErrorKind::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for ErrorKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "rate_limit" | "rate_limited" | "ratelimit" => ErrorKind::RateLimited,
            "timeout" | "timed_out" => ErrorKind::Timeout,
            "unrecoverable" | "fatal" => ErrorKind::Unrecoverable,
            _ => ErrorKind::Other(OtherTag(tag)),
        }
    }
}

impl From<&str> for ErrorKind {
    fn from(tag: &str) -> Self {
        ErrorKind::from(tag.to_string())
    }
}

impl From<ErrorKind> for String {
    fn from(kind: ErrorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure reported by a collaborator (or by the driver) into a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    /// Classification tag
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
    /// Whether the reporter believes the failure can be retried
    pub recoverable: bool,
}

impl AgentError {
    pub fn new(kind: impl Into<ErrorKind>, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            recoverable,
        }
    }

    /// Throttling failure; retryable by default.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message, true)
    }

    /// Deadline failure; retryable by default.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message, true)
    }

    /// Terminal failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unrecoverable, message, false)
    }

    /// Unclassified failure with an explicit tag.
    pub fn other(tag: impl Into<String>, message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ErrorKind::from(tag.into()), message, recoverable)
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let recoverability = if self.recoverable {
            "recoverable"
        } else {
            "fatal"
        };
        write!(f, "[{}/{}] {}", self.kind, recoverability, self.message)
    }
}

impl std::error::Error for AgentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_known_tags() {
        assert_eq!(ErrorKind::from("rate_limit"), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from("RATE_LIMITED"), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from("timeout"), ErrorKind::Timeout);
        assert_eq!(ErrorKind::from("fatal"), ErrorKind::Unrecoverable);
        let other = ErrorKind::from("parse_error");
        assert!(matches!(&other, ErrorKind::Other(tag) if tag.as_str() == "parse_error"));
    }

    #[test]
    fn test_known_tags_never_become_other() {
        for tag in ["timeout", " Timeout ", "rate_limit", "ratelimit", "fatal", "unrecoverable"] {
            assert!(!matches!(ErrorKind::from(tag), ErrorKind::Other(_)), "{tag}");
        }
    }

    #[test]
    fn test_kind_survives_json_round_trip() {
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::RateLimited,
            ErrorKind::Unrecoverable,
            ErrorKind::from("gate_rejected"),
        ] {
            let error = AgentError::new(kind.clone(), "x", true);
            let json = serde_json::to_string(&error).unwrap();
            let parsed: AgentError = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.kind, kind);
        }
    }

    #[test]
    fn test_kind_serializes_as_tag() {
        let error = AgentError::timeout("fetch exceeded 30s");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["recoverable"], true);

        let parsed: AgentError = serde_json::from_str(
            r#"{"kind":"rate_limit","message":"429","recoverable":false}"#,
        )
        .unwrap();
        assert_eq!(parsed.kind, ErrorKind::RateLimited);
        assert!(!parsed.recoverable);
    }

    #[test]
    fn test_constructors() {
        assert!(AgentError::rate_limited("slow down").recoverable);
        let fatal = AgentError::fatal("disk gone");
        assert_eq!(fatal.kind, ErrorKind::Unrecoverable);
        assert!(!fatal.recoverable);
        let other = AgentError::other("gate_rejected", "quality too low", true);
        assert_eq!(other.kind.as_str(), "gate_rejected");
    }

    #[test]
    fn test_display() {
        let error = AgentError::other("x", "boom", false);
        assert_eq!(error.to_string(), "[x/fatal] boom");
    }
}
