//! Gateway configuration.
//!
//! Configuration is read from environment variables once at startup. All
//! startup-time failures (missing variables, unreadable key material,
//! malformed route tables) surface as [`ConfigError`], which is fatal: the
//! process refuses to serve rather than run with a partial configuration.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default listen address when `BIND_ADDRESS` is not set.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9000";

/// Default timeout for forwarded requests to tier backends.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// Default leeway applied to `exp`/`nbf` validation (seconds).
pub const DEFAULT_JWT_LEEWAY_SECONDS: u64 = 60;

/// Upper bound on configurable leeway (10 minutes).
///
/// Prevents a misconfigured deployment from weakening temporal-claim
/// enforcement with an excessively large tolerance.
pub const MAX_JWT_LEEWAY_SECONDS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the gateway listens on (plaintext HTTP; TLS is external).
    pub bind_address: String,

    /// Path to the tier routing table (JSON).
    pub routes_file: PathBuf,

    /// Path to the PEM-encoded RSA public key used for token verification.
    pub public_key_file: PathBuf,

    /// Timeout for each forwarded request.
    pub upstream_timeout: Duration,

    /// Clock-skew tolerance for `exp`/`nbf` validation.
    pub jwt_leeway_seconds: u64,
}

/// Fatal startup errors. The process must not serve traffic after any of
/// these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed route table: {0}")]
    MalformedRoutes(String),

    #[error("Route table contains no routes")]
    EmptyRouteTable,

    #[error("Invalid route for tier {tier:?}: {reason}")]
    InvalidRoute { tier: String, reason: String },

    #[error("Invalid verification key: {0}")]
    InvalidPublicKey(String),

    #[error("Failed to build forwarding client: {0}")]
    HttpClient(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (test seam).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let routes_file = vars
            .get("GATEWAY_ROUTES_FILE")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("GATEWAY_ROUTES_FILE".to_string()))?;

        let public_key_file = vars
            .get("GATEWAY_PUBLIC_KEY_FILE")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("GATEWAY_PUBLIC_KEY_FILE".to_string()))?;

        let upstream_timeout_seconds = parse_u64(
            vars,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        )?;
        if upstream_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                var: "UPSTREAM_TIMEOUT_SECONDS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let jwt_leeway_seconds = parse_u64(vars, "JWT_LEEWAY_SECONDS", DEFAULT_JWT_LEEWAY_SECONDS)?;
        if jwt_leeway_seconds > MAX_JWT_LEEWAY_SECONDS {
            return Err(ConfigError::InvalidValue {
                var: "JWT_LEEWAY_SECONDS".to_string(),
                reason: format!("must not exceed {MAX_JWT_LEEWAY_SECONDS}"),
            });
        }

        Ok(Config {
            bind_address,
            routes_file,
            public_key_file,
            upstream_timeout: Duration::from_secs(upstream_timeout_seconds),
            jwt_leeway_seconds,
        })
    }
}

fn parse_u64(
    vars: &HashMap<String, String>,
    var: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match vars.get(var) {
        None => Ok(default),
        Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}
