//! Command-line client settings.
//!
//! Settings never contain passwords or app passwords.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// Persisted preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server base URL.
    pub server: Option<String>,

    /// Login name used for basic auth.
    pub username: Option<String>,

    /// User agent override. Also names app passwords created by login.
    pub user_agent: Option<String>,

    /// How long `login` waits for browser confirmation.
    pub login_timeout_secs: u64,

    /// Delay between login confirmation polls.
    pub poll_interval_secs: u64,

    /// Talk API version for avatar calls.
    pub talk_api_version: u8,

    /// Log level when neither `--verbose` nor `--quiet` is given.
    pub log_level: LogLevel,

    /// When the last login flow completed.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: None,
            username: None,
            user_agent: None,
            login_timeout_secs: 60,
            poll_interval_secs: 1,
            talk_api_version: 1,
            log_level: LogLevel::default(),
            last_login_at: None,
        }
    }
}

impl Settings {
    /// Keys accepted by [`set_value`](Self::set_value).
    pub const KEYS: &'static [&'static str] = &[
        "server",
        "username",
        "user_agent",
        "login_timeout_secs",
        "poll_interval_secs",
        "talk_api_version",
        "log_level",
    ];

    /// Login confirmation timeout.
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    /// Login poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Sets a value from its string form. An empty value clears optional keys.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownKey`] or [`StoreError::InvalidValue`].
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.trim();
        let optional = || (!value.is_empty()).then(|| value.to_string());

        match key {
            "server" => {
                self.server = if value.is_empty() {
                    None
                } else {
                    Some(normalize_server(value)?)
                };
            }
            "username" => self.username = optional(),
            "user_agent" => self.user_agent = optional(),
            "login_timeout_secs" => {
                self.login_timeout_secs = value
                    .parse()
                    .map_err(|_| StoreError::invalid(key, "expected whole seconds"))?;
            }
            "poll_interval_secs" => {
                self.poll_interval_secs = match value.parse() {
                    Ok(0) | Err(_) => {
                        return Err(StoreError::invalid(key, "expected a positive number of seconds"))
                    }
                    Ok(secs) => secs,
                };
            }
            "talk_api_version" => {
                self.talk_api_version = match value.parse() {
                    Ok(0) | Err(_) => return Err(StoreError::invalid(key, "expected 1 to 255")),
                    Ok(version) => version,
                };
            }
            "log_level" => self.log_level = value.parse()?,
            other => return Err(StoreError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Validates a server URL and strips the trailing slash.
fn normalize_server(value: &str) -> Result<String, StoreError> {
    let url = Url::parse(value).map_err(|e| StoreError::invalid("server", e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(StoreError::invalid("server", "expected an http(s) URL"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Log level options.
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

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(StoreError::invalid(
                "log_level",
                "expected error, warn, info, debug or trace",
            )),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings loaded from and saved to one JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings for the given path.
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

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings: Settings = load_json_or_default(&path).await;
        debug!(path = %path.display(), "Settings loaded");
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Path of the settings file.
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
    /// As [`Settings::set_value`]. Settings are unchanged on error.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut settings = self.settings.write().await;
        let mut updated = settings.clone();
        updated.set_value(key, value)?;
        *settings = updated;
        Ok(())
    }

    /// Restores defaults in memory.
    pub async fn reset(&self) {
        *self.settings.write().await = Settings::default();
    }

    /// Remembers a completed login. The app password is not stored.
    pub async fn record_login(&self, server: &str, username: &str, at: DateTime<Utc>) {
        self.update(|s| {
            s.server = Some(server.trim_end_matches('/').to_string());
            s.username = Some(username.to_string());
            s.last_login_at = Some(at);
        })
        .await;
    }

    /// Forgets the last login time.
    pub async fn clear_login(&self) {
        self.update(|s| s.last_login_at = None).await;
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
