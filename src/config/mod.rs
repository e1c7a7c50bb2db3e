use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use crate::utils::time::parse_time_strict;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub company_code: String,
    #[serde(default = "default_reason_code")]
    pub reason_code: String,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    #[serde(default = "default_geocoder_user_agent")]
    pub geocoder_user_agent: String,
    #[serde(default = "default_sync_checkpoints")]
    pub sync_checkpoints: Vec<String>,
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval_secs: u64,
    #[serde(default = "default_location_interval")]
    pub location_interval_secs: u64,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
    #[serde(default = "default_recovery_grace")]
    pub recovery_grace_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}
fn default_reason_code() -> String {
    "MANUAL".to_string()
}
fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}
fn default_geocoder_user_agent() -> String {
    format!("rpunch/{}", env!("CARGO_PKG_VERSION"))
}
fn default_sync_checkpoints() -> Vec<String> {
    vec!["09:50".to_string(), "18:00".to_string()]
}
fn default_liveness_interval() -> u64 {
    10
}
fn default_location_interval() -> u64 {
    120
}
fn default_sync_interval() -> u64 {
    120
}
fn default_recovery_grace() -> u64 {
    300
}
fn default_connect_timeout() -> u64 {
    3_000
}
fn default_request_timeout() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "warn".to_string()
}

/// Every field a complete config file is expected to carry.
const KNOWN_FIELDS: &[&str] = &[
    "database",
    "api_base_url",
    "company_code",
    "reason_code",
    "geocoder_url",
    "geocoder_user_agent",
    "sync_checkpoints",
    "liveness_interval_secs",
    "location_interval_secs",
    "sync_interval_secs",
    "recovery_grace_secs",
    "connect_timeout_ms",
    "request_timeout_ms",
    "log_level",
];

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: String) -> Self {
        Self {
            database,
            api_base_url: default_api_base_url(),
            company_code: String::new(),
            reason_code: default_reason_code(),
            geocoder_url: default_geocoder_url(),
            geocoder_user_agent: default_geocoder_user_agent(),
            sync_checkpoints: default_sync_checkpoints(),
            liveness_interval_secs: default_liveness_interval(),
            location_interval_secs: default_location_interval(),
            sync_interval_secs: default_sync_interval(),
            recovery_grace_secs: default_recovery_grace(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            log_level: default_log_level(),
        }
    }

    /// Return the standard configuration directory depending on the platform.
    /// `RPUNCH_HOME` overrides it.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("RPUNCH_HOME") {
            return PathBuf::from(dir);
        }
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rpunch")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".rpunch")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rpunch.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rpunch.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let cfg: Config = serde_yaml::from_str(&content)?;
            cfg.validate()?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> AppResult<()> {
        self.checkpoint_times()?;
        for (name, secs) in [
            ("liveness_interval_secs", self.liveness_interval_secs),
            ("location_interval_secs", self.location_interval_secs),
            ("sync_interval_secs", self.sync_interval_secs),
        ] {
            if secs == 0 {
                return Err(AppError::Config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Parsed `sync_checkpoints`, sorted.
    pub fn checkpoint_times(&self) -> AppResult<Vec<NaiveTime>> {
        let mut out = Vec::with_capacity(self.sync_checkpoints.len());
        for raw in &self.sync_checkpoints {
            out.push(parse_time_strict(raw.trim())?);
        }
        out.sort();
        Ok(out)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Fields missing from the config file on disk (defaults are applied for them).
    pub fn missing_fields() -> AppResult<Vec<String>> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(KNOWN_FIELDS.iter().map(|s| s.to_string()).collect());
        }

        let content = fs::read_to_string(&path)?;
        let yaml: Value = serde_yaml::from_str(&content)?;
        let map = yaml
            .as_mapping()
            .ok_or_else(|| AppError::Config("config file is not a YAML mapping".into()))?;

        Ok(KNOWN_FIELDS
            .iter()
            .filter(|f| !map.contains_key(**f))
            .map(|s| s.to_string())
            .collect())
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let config = Config::with_database(db_path.to_string_lossy().to_string());

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            fs::write(Self::config_file(), yaml)?;
        }

        Ok(config)
    }
}
