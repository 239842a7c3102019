//! Configuration management
//!
//! Settings live in `settings.json` under the app directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://127.0.0.1:8000" },
//!   "session": { "inactivityMinutes": 15 },
//!   "history": { "pageSize": 10 }
//! }
//! ```
//! A missing or corrupt file falls back to defaults. `VAULTBANK_API_URL`
//! overrides the base URL for CI/testing.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_INACTIVITY_MINUTES: u64 = 15;
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 10;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    session: SessionSettings,
    #[serde(default)]
    history: HistorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default = "default_base_url")]
    base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSettings {
    #[serde(default = "default_inactivity_minutes")]
    inactivity_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistorySettings {
    #[serde(default = "default_page_size")]
    page_size: usize,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_inactivity_minutes() -> u64 {
    DEFAULT_INACTIVITY_MINUTES
}

fn default_page_size() -> usize {
    DEFAULT_HISTORY_PAGE_SIZE
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            inactivity_minutes: default_inactivity_minutes(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// VaultBank client configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub inactivity_minutes: u64,
    pub history_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            inactivity_minutes: default_inactivity_minutes(),
            history_page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Load config from the app directory, applying env overrides
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let api_base_url =
            std::env::var("VAULTBANK_API_URL").unwrap_or(raw.api.base_url);

        Ok(Self {
            api_base_url,
            inactivity_minutes: raw.session.inactivity_minutes,
            history_page_size: raw.history.page_size.max(1),
        })
    }

    /// Save config to the app directory
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(app_dir)?;
        let settings = SettingsFile {
            api: ApiSettings {
                base_url: self.api_base_url.clone(),
            },
            session: SessionSettings {
                inactivity_minutes: self.inactivity_minutes,
            },
            history: HistorySettings {
                page_size: self.history_page_size,
            },
        };
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(app_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.inactivity_minutes, DEFAULT_INACTIVITY_MINUTES);
        assert_eq!(config.history_page_size, DEFAULT_HISTORY_PAGE_SIZE);
    }

    #[test]
    fn test_partial_settings_fill_in_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api": {"baseUrl": "https://bank.example.com"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, "https://bank.example.com");
        assert_eq!(config.inactivity_minutes, DEFAULT_INACTIVITY_MINUTES);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            api_base_url: "https://bank.example.com".to_string(),
            inactivity_minutes: 5,
            history_page_size: 25,
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api_base_url, "https://bank.example.com");
        assert_eq!(loaded.inactivity_minutes, 5);
        assert_eq!(loaded.history_page_size, 25);
    }
}
