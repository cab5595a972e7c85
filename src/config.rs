use crate::core::{RestoreError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_API_BASE_URL: &str = "https://api.mojang.com";
pub const DEFAULT_SESSION_BASE_URL: &str = "https://sessionserver.mojang.com";

/// Restoration service configuration
///
/// Built with the same builder pattern as the rest of the crate; every setter
/// consumes and returns `self`.
#[derive(Debug, Clone)]
pub struct RestoreConfig {
    /// World folder holding `playerdata/`, `advancements/` and `stats/`
    pub data_root: PathBuf,

    /// Host user cache (`usercache.json`) used to map identities back to names
    pub user_cache_path: Option<PathBuf>,

    /// Base URL of the username lookup service
    pub api_base_url: String,

    /// Base URL of the session/profile service
    pub session_base_url: String,

    /// Timeout applied to every outbound request
    pub http_timeout: Duration,

    /// Delay between a connection being established and the restore attempt
    pub join_delay: Duration,

    /// Maximum number of restore pipelines running at once
    pub max_workers: usize,

    /// Shown to a player disconnected after a successful restore
    pub reconnect_message: String,

    /// Shown to a player whose restore could not be written
    pub failure_message: String,

    /// Shown to a player whose cached skin was re-applied
    pub skin_applied_message: String,
}

impl RestoreConfig {
    /// Create a configuration for the given world folder
    pub fn new(data_root: impl AsRef<Path>) -> Self {
        Self {
            data_root: data_root.as_ref().to_path_buf(),
            user_cache_path: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_base_url: DEFAULT_SESSION_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            // 60 server ticks
            join_delay: Duration::from_secs(3),
            max_workers: 4,
            reconnect_message: "Data restored - please rejoin to load your items".to_string(),
            failure_message: "Failed to write restore files (permission error?)".to_string(),
            skin_applied_message: "Skin property applied; rejoin to see changes.".to_string(),
        }
    }

    /// Set the user cache location
    pub fn user_cache_path(mut self, path: impl AsRef<Path>) -> Self {
        self.user_cache_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the lookup service base URL
    pub fn api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the profile service base URL
    pub fn session_base_url(mut self, url: &str) -> Self {
        self.session_base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set post-join delay
    pub fn join_delay(mut self, delay: Duration) -> Self {
        self.join_delay = delay;
        self
    }

    /// Set worker limit
    pub fn max_workers(mut self, max: usize) -> Self {
        self.max_workers = max;
        self
    }

    pub fn reconnect_message(mut self, message: &str) -> Self {
        self.reconnect_message = message.to_string();
        self
    }

    pub fn failure_message(mut self, message: &str) -> Self {
        self.failure_message = message.to_string();
        self
    }

    pub fn skin_applied_message(mut self, message: &str) -> Self {
        self.skin_applied_message = message.to_string();
        self
    }

    /// Resolved user cache path; defaults to `usercache.json` next to the world folder
    pub fn resolved_user_cache_path(&self) -> PathBuf {
        match &self.user_cache_path {
            Some(path) => path.clone(),
            None => self
                .data_root
                .parent()
                .unwrap_or(&self.data_root)
                .join("usercache.json"),
        }
    }

    /// Build from `RESTORE_*` environment variables
    ///
    /// `RESTORE_DATA_ROOT` is required; the rest override defaults.
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("RESTORE_DATA_ROOT")
            .map_err(|_| RestoreError::Config("RESTORE_DATA_ROOT is not set".to_string()))?;
        let mut config = Self::new(root);

        if let Ok(path) = std::env::var("RESTORE_USER_CACHE") {
            config = config.user_cache_path(path);
        }
        if let Ok(url) = std::env::var("RESTORE_API_BASE_URL") {
            config = config.api_base_url(&url);
        }
        if let Ok(url) = std::env::var("RESTORE_SESSION_BASE_URL") {
            config = config.session_base_url(&url);
        }
        if let Some(ms) = env_u64("RESTORE_HTTP_TIMEOUT_MS")? {
            config = config.http_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = env_u64("RESTORE_JOIN_DELAY_MS")? {
            config = config.join_delay(Duration::from_millis(ms));
        }
        if let Some(max) = env_u64("RESTORE_MAX_WORKERS")? {
            config = config.max_workers(max as usize);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_root.as_os_str().is_empty() {
            return Err(RestoreError::Config("data_root cannot be empty".to_string()));
        }

        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("session_base_url", &self.session_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RestoreError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.max_workers == 0 {
            return Err(RestoreError::Config("max_workers must be > 0".to_string()));
        }
        if self.max_workers > Semaphore::MAX_PERMITS {
            return Err(RestoreError::Config(format!(
                "max_workers must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                self.max_workers
            )));
        }

        if self.http_timeout.is_zero() {
            return Err(RestoreError::Config("http_timeout must be > 0".to_string()));
        }

        Ok(())
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| RestoreError::Config(format!("{} must be an integer, got '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
