//! Logging infrastructure - structured run logging.
//!
//! Provides [`JsonlRunLogger`], a JSONL file writer implementing the
//! [`RunLogger`](research_application::RunLogger) port, and
//! [`snapshot_listener`], which feeds state machine snapshots into any
//! run logger.

mod jsonl_logger;
mod snapshot;

pub use jsonl_logger::JsonlRunLogger;
pub use snapshot::snapshot_listener;
