//! Request-scoped error taxonomy and wire mapping.
//!
//! Every failure class carries a stable, non-sensitive code in a JSON
//! envelope: `{"error":{"code":"...","message":"..."}}`. Internal
//! diagnostics (transport errors, signature details) are logged at debug
//! level where they occur and never serialized to clients.

use crate::auth::{AuthError, ClaimError};
use crate::proxy::ForwardError;
use crate::routing::RoutingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Per-request failure, produced by exactly one pipeline stage.
///
/// All variants are terminal for the request: no retries, no effect on
/// other in-flight requests, never fatal to the process.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Failed to reach the tier backend")]
    Upstream(#[source] reqwest::Error),

    #[error("Internal gateway error")]
    Internal(String),
}

impl From<ForwardError> for GatewayError {
    fn from(error: ForwardError) -> Self {
        match error {
            ForwardError::Upstream(source) => GatewayError::Upstream(source),
            ForwardError::Internal(reason) => GatewayError::Internal(reason),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl GatewayError {
    /// HTTP status for this failure class.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Claim(_) => StatusCode::BAD_REQUEST,
            GatewayError::Routing(RoutingError::UnknownTier) => StatusCode::FORBIDDEN,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable classification code, safe to expose to clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Auth(_) => "INVALID_TOKEN",
            GatewayError::Claim(ClaimError::MissingTierClaim) => "MISSING_TIER",
            GatewayError::Claim(ClaimError::InvalidTierType) => "INVALID_TIER",
            GatewayError::Routing(RoutingError::UnknownTier) => "UNKNOWN_TIER",
            GatewayError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-visible message. Generic by design: one string per class,
    /// never the underlying diagnostic.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            GatewayError::Auth(_) => "The access token is invalid or expired",
            GatewayError::Claim(ClaimError::MissingTierClaim) => "Token is missing the tier claim",
            GatewayError::Claim(ClaimError::InvalidTierType) => {
                "Token tier claim has an invalid type"
            }
            GatewayError::Routing(RoutingError::UnknownTier) => {
                "No backend configured for the requested tier"
            }
            GatewayError::Upstream(_) => "The tier backend is unavailable",
            GatewayError::Internal(_) => "An internal error occurred",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.message().to_string(),
            },
        };

        (self.status(), Json(error_response)).into_response()
    }
}
