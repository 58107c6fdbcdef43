//! HTTP routes for the tier gateway.
//!
//! Defines the axum router and the shared application state.

use crate::auth::TokenValidator;
use crate::handlers;
use crate::proxy::ForwardingEngine;
use crate::routing::RouteTable;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers.
///
/// Everything here is established before serving begins and is read-only
/// afterwards, so concurrent requests share it without locking.
#[derive(Debug)]
pub struct AppState {
    /// Immutable tier-to-backend mapping.
    pub route_table: RouteTable,

    /// Token validator holding the verification key.
    pub validator: TokenValidator,

    /// Forwarding engine with the shared upstream client.
    pub engine: ForwardingEngine,
}

/// Build the application routes.
///
/// - `GET /health` - liveness probe, public, never enters the dispatch
///   pipeline
/// - everything else - the authenticated reverse-proxy path
/// - `TraceLayer` for request logging
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .fallback(handlers::dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
