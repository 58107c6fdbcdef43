//! Tier claim resolution.

use crate::auth::claims::VerifiedClaims;
use serde_json::Value;
use thiserror::Error;

/// Name of the claim that selects the backend.
pub const TIER_CLAIM: &str = "tier";

/// Request-scoped claim failures, mapped to 400 by the dispatcher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// No `tier` claim in the verified claim set.
    #[error("Token is missing the tier claim")]
    MissingTierClaim,

    /// `tier` claim present but not a string.
    #[error("Token tier claim has an invalid type")]
    InvalidTierType,
}

/// Extract the tier name from verified claims.
///
/// The empty string is a valid tier name; it is returned as-is and will
/// simply miss in the route table.
///
/// # Errors
///
/// [`ClaimError::MissingTierClaim`] when absent,
/// [`ClaimError::InvalidTierType`] when present with a non-string type.
pub fn resolve_tier(claims: &VerifiedClaims) -> Result<String, ClaimError> {
    match claims.get(TIER_CLAIM) {
        None => {
            tracing::debug!(target: "gateway.auth", "Token has no tier claim");
            Err(ClaimError::MissingTierClaim)
        }
        Some(Value::String(tier)) => Ok(tier.clone()),
        Some(other) => {
            tracing::debug!(
                target: "gateway.auth",
                claim_type = type_name(other),
                "Tier claim has a non-string type"
            );
            Err(ClaimError::InvalidTierType)
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
