//! Runtime configuration for the oracle listener.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8095;
/// Per-request timeout used when `ORACLE_REQUEST_TIMEOUT_MS` is unset.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Environment variable overriding the listening port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the bind address.
pub const ENV_HOST: &str = "ORACLE_HOST";
/// Environment variable overriding the request timeout in milliseconds.
pub const ENV_REQUEST_TIMEOUT_MS: &str = "ORACLE_REQUEST_TIMEOUT_MS";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    /// An environment variable held an unparseable value.
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Offending raw value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Oracle listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Socket address where the oracle listens.
    pub listen: SocketAddr,
    /// Bound on reading and resolving a single request.
    pub request_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl OracleConfig {
    /// Builds a config listening on `listen` with default limits.
    pub fn new(listen: SocketAddr) -> Self {
        Self {
            listen,
            ..Self::default()
        }
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads overrides through `lookup`; unset or empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = non_empty(lookup(ENV_HOST)) {
            let ip = raw.parse::<IpAddr>().map_err(|err| invalid(ENV_HOST, &raw, err))?;
            cfg.listen.set_ip(ip);
        }
        if let Some(raw) = non_empty(lookup(ENV_PORT)) {
            let port = raw.parse::<u16>().map_err(|err| invalid(ENV_PORT, &raw, err))?;
            cfg.listen.set_port(port);
        }
        if let Some(raw) = non_empty(lookup(ENV_REQUEST_TIMEOUT_MS)) {
            let ms = raw
                .parse::<u64>()
                .map_err(|err| invalid(ENV_REQUEST_TIMEOUT_MS, &raw, err))?;
            if ms == 0 {
                return Err(invalid(ENV_REQUEST_TIMEOUT_MS, &raw, "must be positive"));
            }
            cfg.request_timeout = Duration::from_millis(ms);
        }
        Ok(cfg)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidVar {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
