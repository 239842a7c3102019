//! CLI command implementations

pub mod account;
pub mod admin;
pub mod history;
pub mod login;
pub mod password;
pub mod shell;
pub mod signup;
pub mod status;
pub mod twofactor;

use std::path::PathBuf;

use anyhow::{Context, Result};
use vaultbank_core::services::{LogEvent, LoggingService};
use vaultbank_core::BankContext;

/// Get the app directory from environment or default
pub fn get_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VAULTBANK_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".vaultbank")
    }
}

/// Get or create the bank context
pub fn get_context() -> Result<BankContext> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {app_dir:?}"))?;

    BankContext::new(&app_dir).context("Failed to initialize client context")
}

/// Get the event logger for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir).ok()?;
    LoggingService::new(&app_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}
