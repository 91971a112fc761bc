//! Connection defaults and CLI preferences.

use nxql_core::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Portal host, as typed by the user.
    pub portal_host: Option<String>,

    /// Portal port when the host has none.
    pub portal_port: u16,

    /// Engine port; 0 infers it from the portal host.
    pub engine_port: u16,

    /// Account name.
    pub username: Option<String>,

    /// Accept invalid TLS certificates.
    pub skip_cert_validation: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Platforms applied to queries that name none.
    pub default_platforms: Vec<Platform>,

    /// CLI log level when neither `--verbose` nor `--quiet` is given.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portal_host: None,
            portal_port: 443,
            engine_port: 0,
            username: None,
            skip_cert_validation: false,
            timeout_secs: 60,
            default_platforms: Vec::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Keys accepted by [`Settings::set`].
    pub const KEYS: &'static [&'static str] = &[
        "portal_host",
        "portal_port",
        "engine_port",
        "username",
        "skip_cert_validation",
        "timeout_secs",
        "default_platforms",
        "log_level",
    ];

    /// Sets one setting from its string form.
    ///
    /// An empty value clears optional settings. `default_platforms` takes a
    /// comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or unparseable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.trim();
        let invalid = |reason: String| StoreError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        match key {
            "portal_host" => self.portal_host = non_empty(value),
            "username" => self.username = non_empty(value),
            "portal_port" => self.portal_port = value.parse().map_err(|e| invalid(format!("{e}")))?,
            "engine_port" => self.engine_port = value.parse().map_err(|e| invalid(format!("{e}")))?,
            "timeout_secs" => {
                let secs: u64 = value.parse().map_err(|e| invalid(format!("{e}")))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                self.timeout_secs = secs;
            }
            "skip_cert_validation" => {
                self.skip_cert_validation = value.parse().map_err(|e| invalid(format!("{e}")))?;
            }
            "default_platforms" => {
                self.default_platforms = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<Platform>().map_err(|e| invalid(e.to_string())))
                    .collect::<Result<_, _>>()?;
            }
            "log_level" => self.log_level = value.parse().map_err(invalid)?,
            other => return Err(StoreError::UnknownKey(other.to_string())),
        }

        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl LogLevel {
    /// Lowercase name, as used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to a file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path; a missing or corrupt file yields defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings: Settings = load_json_or_default(&path).await;
        debug!(path = %path.display(), "Settings loaded");

        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Sets one key from its string form.
    ///
    /// # Errors
    ///
    /// See [`Settings::set`].
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.settings.write().await.set(key, value)
    }

    /// Restores defaults in memory.
    pub async fn reset(&self) {
        *self.settings.write().await = Settings::default();
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.portal_port, 443);
        assert_eq!(settings.engine_port, 0);
        assert_eq!(settings.timeout_secs, 60);
        assert!(!settings.skip_cert_validation);
        assert!(settings.default_platforms.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"portal_host":"demo.pac.nexthink.cloud"}"#).unwrap();
        assert_eq!(settings.portal_host.as_deref(), Some("demo.pac.nexthink.cloud"));
        assert_eq!(settings.portal_port, 443);
    }

    #[test]
    fn test_set_keys() {
        let mut settings = Settings::default();
        settings.set("portal_host", "portal.corp.local").unwrap();
        settings.set("engine_port", "1671").unwrap();
        settings.set("skip_cert_validation", "true").unwrap();
        settings.set("default_platforms", "windows, mac_os").unwrap();
        settings.set("log_level", "DEBUG").unwrap();

        assert_eq!(settings.portal_host.as_deref(), Some("portal.corp.local"));
        assert_eq!(settings.engine_port, 1671);
        assert!(settings.skip_cert_validation);
        assert_eq!(settings.default_platforms, vec![Platform::Windows, Platform::MacOs]);
        assert_eq!(settings.log_level, LogLevel::Debug);

        settings.set("portal_host", "").unwrap();
        assert!(settings.portal_host.is_none());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut settings = Settings::default();
        assert!(matches!(settings.set("colour", "red"), Err(StoreError::UnknownKey(_))));
        assert!(matches!(
            settings.set("portal_port", "70000"),
            Err(StoreError::InvalidValue { .. })
        ));
        assert!(settings.set("timeout_secs", "0").is_err());
        assert!(settings.set("default_platforms", "linux").is_err());
    }

    #[test]
    fn test_every_key_is_settable() {
        let mut settings = Settings::default();
        for key in Settings::KEYS {
            let value = match *key {
                "portal_port" | "engine_port" | "timeout_secs" => "10",
                "skip_cert_validation" => "false",
                "default_platforms" => "mobile",
                "log_level" => "info",
                _ => "x",
            };
            settings.set(key, value).unwrap();
        }
    }

    #[tokio::test]
    async fn test_store_save_and_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone());
        store.set("username", "alice").await.unwrap();
        store.update(|s| s.default_platforms = vec![Platform::Mobile]).await;
        store.save().await.unwrap();

        let reloaded = SettingsStore::load(path).await.get().await;
        assert_eq!(reloaded.username.as_deref(), Some("alice"));
        assert_eq!(reloaded.default_platforms, vec![Platform::Mobile]);
    }

    #[tokio::test]
    async fn test_store_reset() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        store.set("timeout_secs", "5").await.unwrap();
        store.reset().await;
        assert_eq!(store.get().await, Settings::default());
    }
}
