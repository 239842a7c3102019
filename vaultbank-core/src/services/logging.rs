//! Client event log
//!
//! Privacy-safe structured logging to a JSON-lines file in the app
//! directory. No user data is ever logged: no amounts, descriptions,
//! account numbers, tokens, or secrets - only event names, command
//! context, and error messages. Logging failures never break a command.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::{Deserialize, Serialize};

const LOG_FILE: &str = "events.jsonl";

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
        }
    }

    /// Set the command context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// One persisted line of the event log
#[derive(Debug, Serialize)]
struct LogLine {
    ts: i64,
    platform: &'static str,
    version: String,
    #[serde(flatten)]
    event: LogEvent,
}

pub struct LoggingService {
    path: PathBuf,
    version: String,
    // One writer at a time; appends stay line-atomic
    lock: Mutex<()>,
}

impl LoggingService {
    pub fn new(app_dir: &Path, version: &str) -> Result<Self> {
        std::fs::create_dir_all(app_dir)?;
        Ok(Self {
            path: app_dir.join(LOG_FILE),
            version: version.to_string(),
            lock: Mutex::new(()),
        })
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        let line = LogLine {
            ts: now_ms(),
            platform: detect_platform(),
            version: self.version.clone(),
            event,
        };
        let serialized = serde_json::to_string(&line)?;

        let _guard = self.lock.lock().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{serialized}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let logger = LoggingService::new(dir.path(), "0.1.0").unwrap();

        logger.log(LogEvent::new("login_success")).unwrap();
        logger
            .log(
                LogEvent::new("command_error")
                    .with_command("history")
                    .with_error("Session expired. Please log in again."),
            )
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "login_success");
        assert_eq!(first["version"], "0.1.0");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["command"], "history");
    }
}
