//! Immutable tier routing table.
//!
//! The table maps tier names to backend base URLs. It is built once at
//! startup from the routes file and never mutated afterwards, so lookups
//! are lock-free and safe under unbounded concurrency.
//!
//! Route URLs are parsed and validated at load time. A tier that resolves
//! from a token but has no entry here is a per-request routing failure
//! ([`RoutingError::UnknownTier`]), never a crash.

use crate::config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Request-scoped routing failure, mapped to 403 by the dispatcher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The resolved tier has no configured backend.
    #[error("No backend configured for the requested tier")]
    UnknownTier,
}

/// On-disk shape of the routes file.
///
/// ```json
/// {"routes": {"gold": "http://backend-a:9001"}}
/// ```
#[derive(Debug, Deserialize)]
struct RouteFile {
    routes: HashMap<String, String>,
}

/// Immutable mapping from tier name to backend base URL.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Url>,
}

impl RouteTable {
    /// Load the table from a JSON routes file.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ConfigError`] when the file is unreadable,
    /// unparsable, empty, or contains a tier name or URL that fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: RouteFile =
            serde_json::from_str(&raw).map_err(|e| ConfigError::MalformedRoutes(e.to_string()))?;

        let table = Self::from_routes(parsed.routes)?;

        tracing::info!(
            target: "gateway.routing",
            route_count = table.len(),
            "Route table loaded"
        );

        Ok(table)
    }

    /// Build the table from in-memory pairs, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRouteTable`] for zero routes,
    /// [`ConfigError::InvalidRoute`] for an empty tier name or a value
    /// that is not an absolute `http`/`https` URL.
    pub fn from_routes<I>(routes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut validated = HashMap::new();

        for (tier, address) in routes {
            if tier.is_empty() {
                return Err(ConfigError::InvalidRoute {
                    tier,
                    reason: "tier name must not be empty".to_string(),
                });
            }

            let url = Url::parse(&address).map_err(|e| ConfigError::InvalidRoute {
                tier: tier.clone(),
                reason: e.to_string(),
            })?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidRoute {
                    tier,
                    reason: format!("unsupported scheme {:?}", url.scheme()),
                });
            }
            if url.host_str().is_none() {
                return Err(ConfigError::InvalidRoute {
                    tier,
                    reason: "URL has no host".to_string(),
                });
            }

            validated.insert(tier, url);
        }

        if validated.is_empty() {
            return Err(ConfigError::EmptyRouteTable);
        }

        Ok(RouteTable { routes: validated })
    }

    /// Look up the backend base URL for a tier.
    ///
    /// Pure and read-only; safe to call from any number of concurrent
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::UnknownTier`] when no entry exists. The
    /// empty string is an ordinary lookup key and simply misses.
    pub fn lookup(&self, tier: &str) -> Result<&Url, RoutingError> {
        self.routes.get(tier).ok_or_else(|| {
            tracing::debug!(target: "gateway.routing", tier = %tier, "Unknown tier");
            RoutingError::UnknownTier
        })
    }

    /// Number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes. Always false after construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
