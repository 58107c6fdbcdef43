//! Credential validation.
//!
//! Verifies RS256-family bearer tokens against the verification key loaded
//! at startup. The declared algorithm is checked against the allowed family
//! BEFORE any signature work, so a token declaring `none` or an HMAC
//! algorithm is rejected even when a signature-shaped segment is present
//! (algorithm-substitution defense).

use crate::auth::claims::VerifiedClaims;
use crate::config::ConfigError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use thiserror::Error;

/// Maximum allowed token size in bytes (8KB).
///
/// Tokens larger than this are rejected before base64 decoding or signature
/// verification, bounding the work an oversized credential can cause.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// The literal prefix a well-formed Authorization header must carry.
const BEARER_PREFIX: &str = "Bearer ";

/// Request-scoped authentication failures, all mapped to 401.
///
/// Display output is intentionally the same generic string for every
/// variant so a response cannot reveal which check failed. Variant detail
/// is logged at debug level where each rejection occurs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent, prefix wrong, or token empty.
    #[error("The access token is invalid or expired")]
    MissingOrMalformedHeader,

    /// Token is oversized or not a decodable three-segment structure.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Declared algorithm is outside the RSA signature family.
    #[error("The access token is invalid or expired")]
    UnsupportedAlgorithm,

    /// Signature does not verify against the configured key.
    #[error("The access token is invalid or expired")]
    InvalidSignature,

    /// Token is past its `exp` claim.
    #[error("The access token is invalid or expired")]
    Expired,

    /// Token's `nbf` claim is in the future.
    #[error("The access token is invalid or expired")]
    NotYetValid,
}

/// Verifies bearer tokens against one RSA public key.
///
/// Constructed once at startup and shared read-only across all concurrent
/// requests; validation never mutates the key.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("decoding_key", &"[REDACTED]")
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenValidator {
    /// Build a validator from a PEM-encoded RSA public key.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ConfigError::InvalidPublicKey`] when the PEM does
    /// not contain an RSA public key.
    pub fn from_pem(pem: &str, leeway_seconds: u64) -> Result<Self, ConfigError> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| ConfigError::InvalidPublicKey(e.to_string()))?;

        Ok(TokenValidator {
            decoding_key,
            leeway_seconds,
        })
    }

    /// Validate an Authorization header value and return the verified
    /// claims.
    ///
    /// The header must be exactly `Bearer ` followed by a non-empty token;
    /// any other form fails before cryptographic work begins.
    ///
    /// Temporal policy: `exp` and `nbf` are enforced when present (with the
    /// configured leeway); a token carrying neither is accepted on
    /// signature grounds alone.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] variant for each failure class; the
    /// dispatcher maps all of them to 401.
    pub fn validate(&self, header_value: Option<&str>) -> Result<VerifiedClaims, AuthError> {
        let header_value = header_value.ok_or_else(|| {
            tracing::debug!(target: "gateway.auth", "Missing Authorization header");
            AuthError::MissingOrMalformedHeader
        })?;

        let token = header_value.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
            tracing::debug!(target: "gateway.auth", "Authorization header lacks Bearer prefix");
            AuthError::MissingOrMalformedHeader
        })?;

        if token.is_empty() {
            tracing::debug!(target: "gateway.auth", "Empty bearer token");
            return Err(AuthError::MissingOrMalformedHeader);
        }

        if token.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(
                target: "gateway.auth",
                token_size = token.len(),
                max_size = MAX_TOKEN_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(AuthError::MalformedToken);
        }

        // Algorithm check happens on the raw header, before any signature
        // work, and regardless of whether a signature segment is present.
        let algorithm = declared_algorithm(token)?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Audience is not part of this gateway's contract; claims pass
        // through untouched.
        validation.validate_aud = false;
        // Explicit temporal policy: exp/nbf are enforced when present but
        // not required. The library's "exp is mandatory" default is not
        // inherited.
        validation.required_spec_claims = HashSet::new();

        let token_data =
            decode::<VerifiedClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(target: "gateway.auth", error = %e, "Token verification failed");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::NotYetValid,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                        AuthError::UnsupportedAlgorithm
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Read the declared signing algorithm from the token header without
/// verifying anything.
///
/// The token must be a three-segment structure with a base64url JSON
/// header. Only the RSA signature family is accepted; `none`, HMAC, and
/// every other declared algorithm is [`AuthError::UnsupportedAlgorithm`].
fn declared_algorithm(token: &str) -> Result<Algorithm, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "gateway.auth",
            segments = parts.len(),
            "Token rejected: not a three-segment structure"
        );
        return Err(AuthError::MalformedToken);
    }

    let header_part = parts.first().ok_or(AuthError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "gateway.auth", error = %e, "Failed to decode token header base64");
        AuthError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "gateway.auth", error = %e, "Failed to parse token header JSON");
        AuthError::MalformedToken
    })?;

    let alg = header
        .get("alg")
        .and_then(|v| v.as_str())
        .ok_or(AuthError::MalformedToken)?;

    match alg {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => {
            tracing::debug!(
                target: "gateway.auth",
                alg = %other,
                "Token rejected: declared algorithm outside the RSA family"
            );
            Err(AuthError::UnsupportedAlgorithm)
        }
    }
}
