//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// run_log = "~/.local/share/research-agent/last-run.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL run transcript path. A leading `~/` expands to the home directory.
    pub run_log: Option<String>,
}

impl FileLoggingConfig {
    pub fn run_log_path(&self) -> Option<PathBuf> {
        let raw = self.run_log.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(rest) = raw.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return Some(home.join(rest));
        }
        Some(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_path() {
        assert_eq!(FileLoggingConfig::default().run_log_path(), None);

        let config = FileLoggingConfig {
            run_log: Some("logs/run.jsonl".to_string()),
        };
        assert_eq!(config.run_log_path(), Some(PathBuf::from("logs/run.jsonl")));

        let blank = FileLoggingConfig {
            run_log: Some("  ".to_string()),
        };
        assert_eq!(blank.run_log_path(), None);
    }

    #[test]
    fn test_home_expansion() {
        let config = FileLoggingConfig {
            run_log: Some("~/runs/a.jsonl".to_string()),
        };
        let path = config.run_log_path().unwrap();
        if dirs::home_dir().is_some() {
            assert!(path.ends_with("runs/a.jsonl"));
            assert!(!path.starts_with("~"));
        }
    }
}
