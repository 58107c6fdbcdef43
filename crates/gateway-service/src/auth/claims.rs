//! Verified token claims.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Claim bag produced only by a successful signature verification.
///
/// Holds the decoded payload of one token and lives for the duration of
/// one request. Claim values may carry user identifiers, so the `Debug`
/// implementation prints claim names only.
#[derive(Clone, Deserialize)]
pub struct VerifiedClaims {
    #[serde(flatten)]
    claims: Map<String, Value>,
}

impl VerifiedClaims {
    /// Get a claim value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Whether a claim is present, regardless of its type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }
}

impl fmt::Debug for VerifiedClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedClaims")
            .field("claims", &self.claims.keys().collect::<Vec<_>>())
            .finish()
    }
}
