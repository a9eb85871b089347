use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    BLOCKED_REPLY_LABELS, DEFAULT_BACKEND_URL, DEFAULT_LIST_LIMIT, MIN_REPLY_CONFIDENCE,
    PREVIEW_LENGTH, REFRESH_DEBOUNCE_MS, REFRESH_INTERVAL_SECS, REQUEST_TIMEOUT_SECS,
};

/// Environment variable that overrides `backend.url`
pub const BACKEND_URL_ENV: &str = "SIFT_BACKEND_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    /// Desktop notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Classification backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of most recent messages per listing
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Seconds between automatic re-syncs of the active view
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Window in which manual refreshes are coalesced
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            refresh_interval_secs: default_refresh_interval_secs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SyncConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Reply eligibility and draft generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_blocked_labels")]
    pub blocked_labels: Vec<String>,
    /// Retries for draft generation when the backend is rate limited
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            blocked_labels: default_blocked_labels(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable desktop notifications for new mail
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Show email subject in notification
    #[serde(default = "default_true")]
    pub show_preview: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_preview: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            preview_length: default_preview_length(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

fn default_refresh_interval_secs() -> u64 {
    REFRESH_INTERVAL_SECS
}

fn default_debounce_ms() -> u64 {
    REFRESH_DEBOUNCE_MS
}

fn default_min_confidence() -> f64 {
    MIN_REPLY_CONFIDENCE
}

fn default_blocked_labels() -> Vec<String> {
    BLOCKED_REPLY_LABELS.iter().map(|l| l.to_string()).collect()
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_preview_length() -> usize {
    PREVIEW_LENGTH
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("sift");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not exist.
    /// `SIFT_BACKEND_URL` takes precedence over the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Config::default()
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV)
            && !url.trim().is_empty()
        {
            config.backend.url = url.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            anyhow::bail!("backend.url must not be empty");
        }
        if self.sync.limit == 0 {
            anyhow::bail!("sync.limit must be at least 1");
        }
        if self.sync.refresh_interval_secs == 0 {
            anyhow::bail!("sync.refresh_interval_secs must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.reply.min_confidence) {
            anyhow::bail!(
                "reply.min_confidence must be between 0 and 1 (got {})",
                self.reply.min_confidence
            );
        }
        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        Ok(())
    }
}
