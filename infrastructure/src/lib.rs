//! Infrastructure layer for research-agent
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the JSONL run logger and
//! scripted collaborators replaying TOML scenarios.

pub mod config;
pub mod logging;
pub mod scenario;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileDriverConfig, FileGatesConfig, FileLoggingConfig,
    FileOutputConfig,
};
pub use logging::{JsonlRunLogger, snapshot_listener};
pub use scenario::{Scenario, ScenarioError, ScenarioStep, ScriptedCollaborator};
