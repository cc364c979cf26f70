//! Application configuration module
//!
//! Configuration is assembled from three layers, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file named by `TASK_SOCIAL_CONFIG`
//! 3. Environment variables
//!
//! ```toml
//! port = 5050
//! database_url = "postgres://localhost/task_social"
//! sweep_interval_secs = 30
//! scheduler_interval_secs = 60
//! write_timeout_ms = 5000
//! outbound_buffer = 64
//! club_scope = "public"
//! notify_rollovers = true
//! ```

use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the optional TOML config file
pub const CONFIG_FILE_ENV: &str = "TASK_SOCIAL_CONFIG";

const DEFAULT_PORT: u16 = 5050;
const DEFAULT_JWT_SECRET: &str = "task-social-development-secret";
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_SCHEDULER_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Which clubs the metric scheduler scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubScope {
    /// Only clubs flagged public
    #[default]
    Public,
    /// Every club, public or private
    All,
}

impl FromStr for ClubScope {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(ClubScope::Public),
            "all" => Ok(ClubScope::All),
            _ => Err(ConfigError::InvalidValue {
                key: "CLUB_SCOPE",
                value: value.to_string(),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// HTTP listen port
    pub port: u16,
    /// PostgreSQL URL; `None` runs against the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret used to verify bearer tokens
    pub jwt_secret: String,
    /// How often expired connections are swept
    pub sweep_interval: Duration,
    /// How often the metric scheduler ticks
    pub scheduler_interval: Duration,
    /// Deadline for a single send to a live connection
    pub write_timeout: Duration,
    /// Frames queued per connection before sends start waiting
    pub outbound_buffer: usize,
    /// Clubs covered by the metric scheduler
    pub club_scope: ClubScope,
    /// Push a notice to club members when a metric rolls over
    pub notify_rollovers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            scheduler_interval: DEFAULT_SCHEDULER_INTERVAL,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            club_scope: ClubScope::Public,
            notify_rollovers: true,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the optional TOML file and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let mut builder = Self::builder();

        if let Some(path) = lookup(CONFIG_FILE_ENV) {
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            builder = builder.merge_toml(&contents)?;
        }

        builder.merge_lookup(lookup)?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET_KEY"));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        if self.scheduler_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SCHEDULER_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        if self.write_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "WRITE_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OUTBOUND_BUFFER",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Shape of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    sweep_interval_secs: Option<u64>,
    scheduler_interval_secs: Option<u64>,
    write_timeout_ms: Option<u64>,
    outbound_buffer: Option<usize>,
    club_scope: Option<ClubScope>,
    notify_rollovers: Option<bool>,
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    sweep_interval: Option<Duration>,
    scheduler_interval: Option<Duration>,
    write_timeout: Option<Duration>,
    outbound_buffer: Option<usize>,
    club_scope: Option<ClubScope>,
    notify_rollovers: Option<bool>,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    pub fn scheduler_interval(mut self, interval: Duration) -> Self {
        self.scheduler_interval = Some(interval);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn outbound_buffer(mut self, frames: usize) -> Self {
        self.outbound_buffer = Some(frames);
        self
    }

    pub fn club_scope(mut self, scope: ClubScope) -> Self {
        self.club_scope = Some(scope);
        self
    }

    pub fn notify_rollovers(mut self, enabled: bool) -> Self {
        self.notify_rollovers = Some(enabled);
        self
    }

    /// Overlay values from a TOML document
    pub fn merge_toml(mut self, contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;

        self.port = file.port.or(self.port);
        self.database_url = file.database_url.or(self.database_url);
        self.jwt_secret = file.jwt_secret.or(self.jwt_secret);
        self.sweep_interval = file
            .sweep_interval_secs
            .map(Duration::from_secs)
            .or(self.sweep_interval);
        self.scheduler_interval = file
            .scheduler_interval_secs
            .map(Duration::from_secs)
            .or(self.scheduler_interval);
        self.write_timeout = file
            .write_timeout_ms
            .map(Duration::from_millis)
            .or(self.write_timeout);
        self.outbound_buffer = file.outbound_buffer.or(self.outbound_buffer);
        self.club_scope = file.club_scope.or(self.club_scope);
        self.notify_rollovers = file.notify_rollovers.or(self.notify_rollovers);

        Ok(self)
    }

    /// Overlay values from environment-style key lookups
    pub fn merge_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_key(&lookup, "PORT")? {
            self.port = Some(port);
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET_KEY").filter(|secret| !secret.is_empty()) {
            self.jwt_secret = Some(secret);
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SWEEP_INTERVAL_SECS")? {
            self.sweep_interval = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCHEDULER_INTERVAL_SECS")? {
            self.scheduler_interval = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, "WRITE_TIMEOUT_MS")? {
            self.write_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(frames) = parse_key(&lookup, "OUTBOUND_BUFFER")? {
            self.outbound_buffer = Some(frames);
        }
        if let Some(scope) = lookup("CLUB_SCOPE") {
            self.club_scope = Some(scope.parse()?);
        }
        if let Some(enabled) = parse_key(&lookup, "NOTIFY_ROLLOVERS")? {
            self.notify_rollovers = Some(enabled);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            port: self.port.unwrap_or(defaults.port),
            database_url: self.database_url,
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
            scheduler_interval: self.scheduler_interval.unwrap_or(defaults.scheduler_interval),
            write_timeout: self.write_timeout.unwrap_or(defaults.write_timeout),
            outbound_buffer: self.outbound_buffer.unwrap_or(defaults.outbound_buffer),
            club_scope: self.club_scope.unwrap_or(defaults.club_scope),
            notify_rollovers: self.notify_rollovers.unwrap_or(defaults.notify_rollovers),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_key<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
