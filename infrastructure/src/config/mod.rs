//! Configuration file loading for research-agent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `RESEARCH_AGENT_<SECTION>__<KEY>` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./research-agent.toml` or `./.research-agent.toml`
//! 4. Global: `$XDG_CONFIG_HOME/research-agent/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileDriverConfig, FileGatesConfig, FileLoggingConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;
