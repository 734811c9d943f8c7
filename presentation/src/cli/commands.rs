//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final state, progress, quality and counts
    Summary,
    /// Summary plus plan, results and the error log
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for research_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => research_domain::OutputFormat::Summary,
            OutputFormat::Full => research_domain::OutputFormat::Full,
            OutputFormat::Json => research_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for research-agent
#[derive(Parser, Debug)]
#[command(name = "research-agent")]
#[command(author, version, about = "Drive a research run through its state machine")]
#[command(long_about = r#"
research-agent drives a research run through a guarded state machine:

  idle -> planning -> searching -> scraping -> analyzing -> verifying -> compiling -> completed

Collaborators replay a TOML scenario (or the built-in demo). Their errors are
routed by per-state recovery policies; transitions are gated on plan presence,
result count, progress and quality.

Configuration files are loaded from (in priority order):
1. RESEARCH_AGENT_<SECTION>__<KEY>            Environment
2. --config <path>                            Explicit config file
3. ./research-agent.toml                      Project-level config
4. ~/.config/research-agent/config.toml       Global config

Example:
  research-agent
  research-agent scenarios/flaky-scraper.toml --output full
  research-agent --print-table
"#)]
pub struct Cli {
    /// Scenario file to replay (defaults to the built-in demo)
    #[arg(value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the transition table with its guards and exit
    #[arg(long)]
    pub print_table: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write a JSONL transcript of the run (overrides [logging] run_log)
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,
}
