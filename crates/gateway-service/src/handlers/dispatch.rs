//! Per-request dispatch pipeline.
//!
//! Every non-health request runs authenticate → resolve tier → route
//! lookup → forward, each stage short-circuiting into the status mapping
//! in [`GatewayError`]: 401 for authentication failures, 400 for tier
//! claim failures, 403 for an unknown tier, 502 for an unreachable
//! backend, 500 for an invalid upstream request. Every rejection is
//! terminal and produces exactly one response; nothing is retried.

use crate::auth::{resolve_tier, TIER_CLAIM};
use crate::errors::GatewayError;
use crate::routes::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::response::Response;
use std::sync::Arc;
use tracing::instrument;

/// The authenticated reverse-proxy path: `ANY /*`.
#[instrument(skip_all, name = "gateway.dispatch", fields(tier))]
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, GatewayError> {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let claims = state.validator.validate(authorization)?;

    let tier = resolve_tier(&claims)?;
    tracing::Span::current().record(TIER_CLAIM, tier.as_str());

    let target = state.route_table.lookup(&tier)?.clone();

    let response = state.engine.forward(&target, req).await?;

    Ok(response)
}
