use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::StageTimeouts;

/// Application-level constants
pub const APP_NAME: &str = "ComplaintOps";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_AI_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REVIEW_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_COMPLAINT_CHARS: usize = 5_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "complaintops=info,complaintops_lib=info,tower_http=warn"
}

/// Get the application data directory
/// ~/ComplaintOps/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Default SQLite file location
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("complaints.db"))
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ai_service_url: String,
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub timeouts: StageTimeouts,
    pub review_timeout: Duration,
    pub max_complaint_chars: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset or blank variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let ai_service_url = get("COMPLAINTOPS_AI_SERVICE_URL")
            .unwrap_or_else(|| DEFAULT_AI_SERVICE_URL.to_string());
        if !ai_service_url.starts_with("http://") && !ai_service_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "COMPLAINTOPS_AI_SERVICE_URL",
                reason: "must start with http:// or https://".into(),
            });
        }

        let bind_addr = parse_or(
            "COMPLAINTOPS_BIND_ADDR",
            get("COMPLAINTOPS_BIND_ADDR"),
            DEFAULT_BIND_ADDR,
        )?;

        let db_path = match get("COMPLAINTOPS_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let defaults = StageTimeouts::default();
        let timeouts = StageTimeouts {
            masking: timeout_ms("COMPLAINTOPS_MASK_TIMEOUT_MS", &get, defaults.masking)?,
            triage: timeout_ms("COMPLAINTOPS_TRIAGE_TIMEOUT_MS", &get, defaults.triage)?,
            retrieval: timeout_ms("COMPLAINTOPS_RETRIEVAL_TIMEOUT_MS", &get, defaults.retrieval)?,
            generation: timeout_ms("COMPLAINTOPS_GENERATION_TIMEOUT_MS", &get, defaults.generation)?,
        };
        let review_timeout = timeout_ms(
            "COMPLAINTOPS_REVIEW_TIMEOUT_MS",
            &get,
            Duration::from_millis(DEFAULT_REVIEW_TIMEOUT_MS),
        )?;

        let max_complaint_chars: usize = match get("COMPLAINTOPS_MAX_COMPLAINT_CHARS") {
            Some(raw) => parse_var("COMPLAINTOPS_MAX_COMPLAINT_CHARS", &raw)?,
            None => DEFAULT_MAX_COMPLAINT_CHARS,
        };
        if max_complaint_chars == 0 {
            return Err(ConfigError::Invalid {
                var: "COMPLAINTOPS_MAX_COMPLAINT_CHARS",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            ai_service_url,
            bind_addr,
            db_path,
            timeouts,
            review_timeout,
            max_complaint_chars,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    parse_var(var, value.as_deref().unwrap_or(default))
}

fn timeout_ms(
    var: &'static str,
    get: &impl Fn(&str) -> Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get(var) else {
        return Ok(default);
    };
    let ms: u64 = parse_var(var, &raw)?;
    if ms == 0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "timeout must be greater than zero".into(),
        });
    }
    Ok(Duration::from_millis(ms))
}
