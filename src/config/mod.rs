use crate::core::retry::RetryPolicy;
use crate::errors::{AppError, AppResult};
use crate::models::toil_settings::{
    DEFAULT_MAX_CAPACITY, DEFAULT_MAX_STREAK_DAYS, DEFAULT_MAX_STREAK_HOURS, MAX_STREAK_DAYS,
    ToilSettings,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod migrate;

const APP_DIR: &str = "toil-ledger";
const CONFIG_FILE: &str = "toil-ledger.conf";
const DATABASE_FILE: &str = "toil-ledger.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Identity used when `--as` is not given.
    #[serde(default)]
    pub default_user: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_capacity")]
    pub default_max_capacity: String,
    #[serde(default = "default_max_streak_hours")]
    pub default_max_streak_hours: String,
    #[serde(default = "default_max_streak_days")]
    pub default_max_streak_days: i64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_max_capacity() -> String {
    DEFAULT_MAX_CAPACITY.to_string()
}
fn default_max_streak_hours() -> String {
    DEFAULT_MAX_STREAK_HOURS.to_string()
}
fn default_max_streak_days() -> i64 {
    DEFAULT_MAX_STREAK_DAYS
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    200
}
fn default_max_backoff_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_cache_ttl() -> u64 {
    30
}
fn default_cache_capacity() -> usize {
    256
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_user: String::new(),
            log_level: default_log_level(),
            default_max_capacity: default_max_capacity(),
            default_max_streak_hours: default_max_streak_hours(),
            default_max_streak_days: default_max_streak_days(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR}")))
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DATABASE_FILE)
    }

    /// Load configuration from the standard location, or defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| AppError::ConfigLoad(e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| AppError::ConfigLoad(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|_| AppError::ConfigSave)
    }

    /// Settings applied to users without a stored settings row.
    pub fn default_settings(&self, user_id: &str) -> ToilSettings {
        ToilSettings {
            user_id: user_id.to_string(),
            max_capacity: self.default_max_capacity.clone(),
            max_streak_hours: self.default_max_streak_hours.clone(),
            max_streak_days: self.default_max_streak_days.clamp(1, MAX_STREAK_DAYS),
        }
    }

    /// Initialize configuration and database files.
    ///
    /// With `is_test` the configuration file is left untouched.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let db_path = match custom_db {
            Some(name) => crate::utils::path::expand_tilde(&name),
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Self::load().unwrap_or_default()
        };

        if !is_test {
            config.save_to(&Self::config_file())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
