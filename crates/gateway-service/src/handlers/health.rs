//! Liveness probe.

/// `GET /health` - always succeeds, no authentication.
pub async fn health_check() -> &'static str {
    "OK"
}
