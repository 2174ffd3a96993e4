//! Service configuration loaded via OrthoConfig.
//!
//! Every value is optional in the environment (`JOURNAL_*`) or a discovered
//! config file; accessors apply the defaults.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{EntryListLimit, PhotoUploadPolicy};
use crate::outbound::credentials::Argon2Settings;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MIN_IDLE: u32 = 1;
const DEFAULT_POOL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_UPLOAD_DIR: &str = "./public/uploads";
const DEFAULT_CORS_ORIGIN: &str = "*";

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
    #[error("unknown store backend {0:?}; expected \"postgres\" or \"memory\"")]
    UnknownBackend(String),
    #[error("the postgres backend requires JOURNAL_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("unknown log format {0:?}; expected \"json\" or \"plain\"")]
    UnknownLogFormat(String),
    #[error("default entry limit: {0}")]
    DefaultEntryLimit(String),
}

/// Which store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(SettingsError::UnknownBackend(other.to_owned())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => f.write_str("postgres"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Plain,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            other => Err(SettingsError::UnknownLogFormat(other.to_owned())),
        }
    }
}

/// Journal service settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "JOURNAL")]
pub struct JournalSettings {
    /// Interface to bind. Defaults to `0.0.0.0`.
    pub bind_addr: Option<String>,
    /// Listening port. Falls back to `PORT`, then 8080.
    pub port: Option<u16>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// `postgres` or `memory`.
    pub store_backend: Option<String>,
    pub pool_max_size: Option<u32>,
    pub pool_min_idle: Option<u32>,
    pub pool_timeout_ms: Option<u64>,
    /// Budget for a single store call.
    pub store_timeout_ms: Option<u64>,
    /// Directory holding uploaded photos.
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    /// Value of `Access-Control-Allow-Origin`.
    pub cors_allow_origin: Option<String>,
    pub argon2_memory_kib: Option<u32>,
    pub argon2_iterations: Option<u32>,
    pub argon2_parallelism: Option<u32>,
    /// Page size when a listing request omits `limit`.
    pub default_entry_limit: Option<u32>,
    /// `json` (default) or `plain`.
    pub log_format: Option<String>,
}

impl JournalSettings {
    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.bind_addr.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| SettingsError::InvalidBindAddr(raw.to_owned()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(ip, self.port()))
    }

    /// `JOURNAL_PORT`, else the platform-provided `PORT`, else 8080.
    pub fn port(&self) -> u16 {
        self.port
            .or_else(|| std::env::var("PORT").ok()?.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Selected backend: explicit setting, else postgres when a database URL
    /// is configured, else memory.
    pub fn store_backend(&self) -> Result<StoreBackend, SettingsError> {
        match self.store_backend.as_deref() {
            Some(raw) => raw.parse(),
            None if self.database_url.is_some() => Ok(StoreBackend::Postgres),
            None => Ok(StoreBackend::Memory),
        }
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
            .with_min_idle(Some(self.pool_min_idle.unwrap_or(DEFAULT_POOL_MIN_IDLE)))
            .with_connection_timeout(Duration::from_millis(
                self.pool_timeout_ms.unwrap_or(DEFAULT_POOL_TIMEOUT_MS),
            ))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn photo_upload_policy(&self) -> PhotoUploadPolicy {
        self.max_upload_bytes
            .map_or_else(PhotoUploadPolicy::default, |max_bytes| PhotoUploadPolicy {
                max_bytes,
            })
    }

    pub fn cors_allow_origin(&self) -> &str {
        self.cors_allow_origin
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGIN)
    }

    /// Argon2id cost; unset fields keep their defaults.
    pub fn argon2_settings(&self) -> Argon2Settings {
        let defaults = Argon2Settings::default();
        Argon2Settings {
            memory_kib: self.argon2_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.argon2_iterations.unwrap_or(defaults.iterations),
            parallelism: self.argon2_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    pub fn default_entry_limit(&self) -> Result<EntryListLimit, SettingsError> {
        self.default_entry_limit.map_or(Ok(EntryListLimit::DEFAULT), |raw| {
            EntryListLimit::new(raw)
                .map_err(|err| SettingsError::DefaultEntryLimit(err.to_string()))
        })
    }

    pub fn log_format(&self) -> Result<LogFormat, SettingsError> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), str::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "JOURNAL_BIND_ADDR",
        "JOURNAL_PORT",
        "PORT",
        "JOURNAL_DATABASE_URL",
        "JOURNAL_STORE_BACKEND",
        "JOURNAL_MAX_UPLOAD_BYTES",
        "JOURNAL_ARGON2_ITERATIONS",
        "JOURNAL_DEFAULT_ENTRY_LIMIT",
        "JOURNAL_LOG_FORMAT",
    ];

    fn load() -> JournalSettings {
        JournalSettings::load_from_iter([OsString::from("journal")]).expect("config should load")
    }

    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));
        let settings = load();

        assert_eq!(settings.port(), DEFAULT_PORT);
        assert_eq!(
            settings.bind_addr().map(|addr| addr.to_string()),
            Ok("0.0.0.0:8080".to_owned())
        );
        assert_eq!(settings.store_backend(), Ok(StoreBackend::Memory));
        assert_eq!(settings.store_timeout(), Duration::from_secs(5));
        assert_eq!(settings.upload_dir(), PathBuf::from("./public/uploads"));
        assert_eq!(settings.photo_upload_policy(), PhotoUploadPolicy::default());
        assert_eq!(settings.argon2_settings(), Argon2Settings::default());
        assert_eq!(settings.default_entry_limit(), Ok(EntryListLimit::DEFAULT));
        assert_eq!(settings.log_format(), Ok(LogFormat::Json));
        assert_eq!(settings.cors_allow_origin(), "*");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("JOURNAL_PORT", "9000"),
            ("JOURNAL_DATABASE_URL", "postgres://localhost/journal"),
            ("JOURNAL_MAX_UPLOAD_BYTES", "1024"),
            ("JOURNAL_ARGON2_ITERATIONS", "3"),
            ("JOURNAL_DEFAULT_ENTRY_LIMIT", "25"),
            ("JOURNAL_LOG_FORMAT", "plain"),
        ]));
        let settings = load();

        assert_eq!(settings.port(), 9000);
        assert_eq!(settings.store_backend(), Ok(StoreBackend::Postgres));
        assert_eq!(settings.database_url(), Ok("postgres://localhost/journal"));
        assert_eq!(settings.photo_upload_policy().max_bytes, 1024);
        assert_eq!(settings.argon2_settings().iterations, 3);
        assert_eq!(
            settings.default_entry_limit().map(EntryListLimit::get),
            Ok(25)
        );
        assert_eq!(settings.log_format(), Ok(LogFormat::Plain));
    }

    #[rstest]
    fn platform_port_is_a_fallback() {
        let _guard = lock_env(env_with(&[("PORT", "5000")]));
        assert_eq!(load().port(), 5000);
    }

    #[rstest]
    #[case("JOURNAL_STORE_BACKEND", "cassandra")]
    #[case("JOURNAL_LOG_FORMAT", "xml")]
    #[case("JOURNAL_DEFAULT_ENTRY_LIMIT", "500")]
    fn invalid_values_are_reported(#[case] key: &'static str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(key, value)]));
        let settings = load();
        let failed = settings.store_backend().is_err()
            || settings.log_format().is_err()
            || settings.default_entry_limit().is_err();
        assert!(failed);
    }

    #[rstest]
    fn postgres_without_url_is_an_error() {
        let _guard = lock_env(env_with(&[("JOURNAL_STORE_BACKEND", "postgres")]));
        let settings = load();
        assert_eq!(settings.store_backend(), Ok(StoreBackend::Postgres));
        assert_eq!(settings.database_url(), Err(SettingsError::MissingDatabaseUrl));
    }
}
