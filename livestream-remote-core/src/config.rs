use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend root, every endpoint path is appended to it
    pub base_url: String,
    /// Value of the fixed client identifier header
    pub client_app_id: String,
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-dev.mismatch.gr/api".to_string(),
            client_app_id: "livestream-remote".to_string(),
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Location of the persisted token pair
    pub token_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            token_file: base.join("livestream-remote").join("auth_tokens.json"),
        }
    }
}

/// Listing window around "now" used when no explicit range is given
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub days_before: i64,
    pub days_after: i64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            days_before: 1,
            days_after: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional file, then environment overrides
    /// (`LSREMOTE_API__BASE_URL`, `LSREMOTE_LOGGING__LEVEL`, ...).
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("LSREMOTE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Check for settings that would make every request fail.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            )),
            Err(e) => errors.push(format!("api.base_url is not a valid URL: {e}")),
        }
        if self.api.client_app_id.trim().is_empty() {
            errors.push("api.client_app_id must not be empty".to_string());
        }
        if self.api.connect_timeout_seconds == 0 || self.api.request_timeout_seconds == 0 {
            errors.push("api timeouts must be greater than zero".to_string());
        }
        if self.events.days_before < 0 || self.events.days_after < 0 {
            errors.push("events window days must not be negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
