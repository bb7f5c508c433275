//! Configuration module for hoard.

use serde::Deserialize;
use std::path::Path;

use crate::{HoardError, Result};

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Mark the session cookie `Secure` (requires HTTPS).
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            cookie_secure: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/hoard.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Object storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible bucket.
    #[default]
    S3,
    /// Process memory (development and tests).
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Region (any value works for most S3-compatible providers).
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, R2, ...).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Use path-style addressing.
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "auto".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum payload size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Maximum expiration in milliseconds for non-admin users.
    #[serde(default = "default_max_expire_ms")]
    pub max_expire_ms: i64,
}

fn default_max_bytes() -> u64 {
    1_000_000_000
}

fn default_max_expire_ms() -> i64 {
    31_556_952_000 // one year
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_expire_ms: default_max_expire_ms(),
        }
    }
}

/// Metadata stripping configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExifConfig {
    /// Whether image/video uploads are stripped.
    #[serde(default = "default_exif_enabled")]
    pub enabled: bool,
    /// Path to the exiftool binary.
    #[serde(default = "default_tool_path")]
    pub tool_path: String,
    /// Directory for temporary job files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// How long a job may wait for the tool before giving up.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Deadline for a single tool invocation.
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_exif_enabled() -> bool {
    true
}

fn default_tool_path() -> String {
    "exiftool".to_string()
}

fn default_temp_dir() -> String {
    std::env::temp_dir().join("hoard").to_string_lossy().into_owned()
}

fn default_lock_timeout() -> u64 {
    30_000
}

fn default_tool_timeout() -> u64 {
    60
}

impl Default for ExifConfig {
    fn default() -> Self {
        Self {
            enabled: default_exif_enabled(),
            tool_path: default_tool_path(),
            temp_dir: default_temp_dir(),
            lock_timeout_ms: default_lock_timeout(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a login session in days.
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    /// Shared secret for the expiry sweep endpoint.
    #[serde(default)]
    pub cron_secret: String,
}

fn default_session_days() -> i64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
            cron_secret: String::new(),
        }
    }
}

/// In-process expiry sweep.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SweepConfig {
    /// Interval between sweeps in seconds (0 = rely on the cron endpoint).
    #[serde(default)]
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/hoard.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Metadata stripping configuration.
    #[serde(default)]
    pub exif: ExifConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Expiry sweep configuration.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(HoardError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| HoardError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `HOARD_CRON_SECRET`: shared secret for `/api/check-expired`
    /// - `HOARD_S3_BUCKET`: bucket name
    /// - `HOARD_DATABASE_PATH`: SQLite database path
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("HOARD_CRON_SECRET") {
            self.auth.cron_secret = secret;
        }
        if let Some(bucket) = non_empty_env("HOARD_S3_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(path) = non_empty_env("HOARD_DATABASE_PATH") {
            self.database.path = path;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(HoardError::Config(
                "storage backend is s3 but no bucket is set. \
                 Set it in config.toml or via HOARD_S3_BUCKET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.session_days <= 0 {
            return Err(HoardError::Config(
                "auth.session_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
