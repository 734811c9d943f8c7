//! Output configuration from TOML (`[output]` section)

use research_domain::{ConfigIssue, OutputFormat};
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Report format: "summary", "full" or "json"
    pub format: Option<String>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar while the run is going
    pub show_progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}

impl FileOutputConfig {
    /// Parse `format`, falling back to the default on unknown values.
    pub fn parse_format(&self) -> (Option<OutputFormat>, Vec<ConfigIssue>) {
        let Some(raw) = self.format.as_deref() else {
            return (None, vec![]);
        };
        match raw.parse::<OutputFormat>() {
            Ok(format) => (Some(format), vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    "output.format",
                    format!(
                        "unknown value '{}' (expected summary, full or json), falling back to '{}'",
                        raw,
                        OutputFormat::default().as_str()
                    ),
                );
                (None, vec![issue])
            }
        }
    }
}
