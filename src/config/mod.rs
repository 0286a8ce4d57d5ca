//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::cache::CacheConfig;
use crate::session::DEFAULT_TOKEN_TTL;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "deptportal";
const ENV_PREFIX: &str = "DEPTPORTAL";
pub(crate) const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings overrides accepted on the command line.
#[derive(Debug, Args, Default, Clone)]
pub struct ConfigOverrides {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "DEPTPORTAL_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(
        long = "api-url",
        env = "DEPTPORTAL_API_URL",
        value_name = "URL",
        global = true
    )]
    pub api_url: Option<String>,

    /// Override the per-request timeout.
    #[arg(long = "request-timeout-seconds", value_name = "SECONDS", global = true)]
    pub request_timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Persist the session cookie to this file.
    #[arg(long = "cookie-file", value_name = "PATH", global = true)]
    pub cookie_file: Option<PathBuf>,

    /// Override how long unused cache entries are kept.
    #[arg(long = "keep-unused-for-seconds", value_name = "SECONDS", global = true)]
    pub keep_unused_for_seconds: Option<u64>,

    /// Override the number of retries for failed GET queries.
    #[arg(long = "query-retries", value_name = "COUNT", global = true)]
    pub query_retries: Option<u32>,
}

/// Fully-resolved client settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub session: SessionSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// When set, the token cookie survives restarts.
    pub cookie_file: Option<PathBuf>,
    pub token_ttl: time::Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(overrides: &ConfigOverrides) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = overrides.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides);
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
    session: RawSessionSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = overrides.api_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.request_timeout_seconds {
            self.api.request_timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.cookie_file.as_ref() {
            self.session.cookie_file = Some(path.clone());
        }
        if let Some(seconds) = overrides.keep_unused_for_seconds {
            self.cache.keep_unused_for_secs = Some(seconds);
        }
        if let Some(retries) = overrides.query_retries {
            self.cache.query_retries = Some(retries);
        }
    }
}

impl Settings {
    /// Built-in defaults, ignoring files, environment and CLI.
    pub fn defaults() -> Result<Self, LoadError> {
        Self::from_raw(RawSettings::default())
    }

    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            logging,
            session,
            cache,
        } = raw;

        let api = build_api_settings(api)?;
        let logging = build_logging_settings(logging)?;
        let session = build_session_settings(session)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            api,
            logging,
            session,
            cache,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = match api.base_url {
        Some(value) => parse_base_url(value.trim())?,
        None => parse_base_url(DEFAULT_API_BASE_URL)?,
    };

    let timeout_secs = api
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "api.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ApiSettings {
        base_url,
        request_timeout: Some(Duration::from_secs(timeout_secs)),
    })
}

fn parse_base_url(value: &str) -> Result<Url, LoadError> {
    let url = Url::parse(value).map_err(|err| {
        LoadError::invalid("api.base_url", format!("invalid url `{value}`: {err}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "api.base_url",
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    Ok(url)
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_session_settings(session: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let cookie_file = session
        .cookie_file
        .filter(|path| !path.as_os_str().is_empty());

    let token_ttl = match session.token_ttl_days {
        Some(0) => {
            return Err(LoadError::invalid(
                "session.token_ttl_days",
                "must be greater than zero",
            ));
        }
        Some(days) => {
            let days = i64::try_from(days).map_err(|_| {
                LoadError::invalid("session.token_ttl_days", "value exceeds supported range")
            })?;
            time::Duration::days(days)
        }
        None => DEFAULT_TOKEN_TTL,
    };

    Ok(SessionSettings {
        cookie_file,
        token_ttl,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheConfig, LoadError> {
    let defaults = CacheConfig::default();
    let retry_base_delay_ms = cache
        .retry_base_delay_ms
        .unwrap_or(defaults.retry_base_delay_ms);
    if retry_base_delay_ms == 0 {
        return Err(LoadError::invalid(
            "cache.retry_base_delay_ms",
            "must be greater than zero",
        ));
    }

    Ok(CacheConfig {
        keep_unused_for_secs: cache
            .keep_unused_for_secs
            .unwrap_or(defaults.keep_unused_for_secs),
        query_retries: cache.query_retries.unwrap_or(defaults.query_retries),
        retry_base_delay_ms,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    cookie_file: Option<PathBuf>,
    token_ttl_days: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    keep_unused_for_secs: Option<u64>,
    query_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}
