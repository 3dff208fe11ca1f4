use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;
pub const DEFAULT_STALE_DRAFT_DAYS: i64 = 7;
pub const DEFAULT_ORGANIZATION_ID: &str = "org-default";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub evaluations: EvaluationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let include_targets = environment == AppEnvironment::Development;

        let autosave_secs = match env::var("APP_AUTOSAVE_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidAutosaveInterval(raw))?,
            Err(_) => DEFAULT_AUTOSAVE_SECS,
        };

        let stale_draft_days = match env::var("APP_STALE_DRAFT_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or(ConfigError::InvalidStaleDraftDays(raw))?,
            Err(_) => DEFAULT_STALE_DRAFT_DAYS,
        };

        let organization_id = env::var("APP_ORGANIZATION_ID")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ORGANIZATION_ID.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            evaluations: EvaluationSettings {
                autosave_interval: Duration::from_secs(autosave_secs),
                stale_draft_after: chrono::Duration::days(stale_draft_days),
                organization_id,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub include_targets: bool,
}

/// Cadence and advisory thresholds for the evaluation lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub autosave_interval: Duration,
    /// Drafts untouched for longer than this are flagged as stale. Never blocking.
    pub stale_draft_after: chrono::Duration,
    pub organization_id: String,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_SECS),
            stale_draft_after: chrono::Duration::days(DEFAULT_STALE_DRAFT_DAYS),
            organization_id: DEFAULT_ORGANIZATION_ID.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAutosaveInterval(String),
    InvalidStaleDraftDays(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAutosaveInterval(raw) => write!(
                f,
                "APP_AUTOSAVE_SECS must be a positive number of seconds, got '{raw}'"
            ),
            ConfigError::InvalidStaleDraftDays(raw) => write!(
                f,
                "APP_STALE_DRAFT_DAYS must be a non-negative number of days, got '{raw}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidAutosaveInterval(_)
            | ConfigError::InvalidStaleDraftDays(_) => None,
        }
    }
}
