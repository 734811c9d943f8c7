//! Port for structured run logging.
//!
//! [`RunLogger`] records what happened during a research run (state changes,
//! collaborator outcomes, errors, gate rejections) as machine-readable
//! events, typically one JSON line per event. This is separate from the
//! human-oriented `tracing` output.

use serde_json::Value;

/// A structured run event.
pub struct RunEvent {
    /// Event type identifier (e.g. "state_changed", "collaborator_error").
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Implementations must not fail the run: write errors are swallowed.
pub trait RunLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// Logger used when run logging is disabled.
pub struct NoRunLogger;

impl RunLogger for NoRunLogger {
    fn log(&self, _event: RunEvent) {}
}
