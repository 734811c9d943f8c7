//! JSONL file writer for run events.
//!
//! Each [`RunEvent`] is serialized as a single JSON line with a `type` field
//! and `timestamp`, appended to the file via a buffered writer.

use research_application::ports::run_logger::{RunEvent, RunLogger};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// JSONL run logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on
/// `Drop`. Write failures never reach the run; the first one is logged.
pub struct JsonlRunLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    write_failed: AtomicBool,
}

impl JsonlRunLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create run log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create run log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            write_failed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JsonlRunLogger {
    /// Payload object fields sit next to `type` and `timestamp`; anything
    /// else is nested under `data`.
    fn record(event: RunEvent) -> serde_json::Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match event.payload {
            serde_json::Value::Object(mut fields) => {
                fields.insert("type".into(), event.event_type.into());
                fields.insert("timestamp".into(), timestamp.into());
                serde_json::Value::Object(fields)
            }
            data => serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": data,
            }),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()
    }

    /// Only the first failure is reported; later ones would repeat it.
    fn report_failure(&self, error: &dyn std::fmt::Display) {
        if !self.write_failed.swap(true, Ordering::Relaxed) {
            warn!(
                path = %self.path.display(),
                "Run log write failed, further events may be lost: {}",
                error
            );
        }
    }
}

impl RunLogger for JsonlRunLogger {
    fn log(&self, event: RunEvent) {
        let line = match serde_json::to_string(&Self::record(event)) {
            Ok(line) => line,
            Err(e) => return self.report_failure(&e),
        };
        if let Err(e) = self.append(&line) {
            self.report_failure(&e);
        }
    }
}

impl Drop for JsonlRunLogger {
    fn drop(&mut self) {
        let flushed = self
            .writer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
        if let Err(e) = flushed {
            self.report_failure(&e);
        }
    }
}
