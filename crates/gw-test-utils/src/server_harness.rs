//! Test server harness.
//!
//! Spawns a real gateway instance on an ephemeral port for end-to-end
//! tests.

use crate::crypto_fixtures::TEST_PUBLIC_KEY_PEM;
use gateway_service::auth::TokenValidator;
use gateway_service::config::DEFAULT_JWT_LEEWAY_SECONDS;
use gateway_service::proxy::ForwardingEngine;
use gateway_service::routes::{build_routes, AppState};
use gateway_service::routing::RouteTable;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upstream timeout for spawned test gateways; short so unreachable
/// backends fail tests quickly.
const TEST_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// A running gateway bound to 127.0.0.1 on a random port, verifying
/// tokens against [`TEST_PUBLIC_KEY_PEM`].
///
/// # Example
/// ```rust,ignore
/// let gateway = TestGateway::spawn(&[("gold", &backend.uri())]).await?;
/// let response = reqwest::Client::new()
///     .get(format!("{}/orders", gateway.url()))
///     .bearer_auth(TestTokenBuilder::new().with_tier("gold").mint())
///     .send()
///     .await?;
/// ```
pub struct TestGateway {
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Spawn a gateway with the given tier → backend routes.
    pub async fn spawn(routes: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let route_table = RouteTable::from_routes(
            routes
                .iter()
                .map(|(tier, address)| (tier.to_string(), address.to_string())),
        )?;

        let validator = TokenValidator::from_pem(TEST_PUBLIC_KEY_PEM, DEFAULT_JWT_LEEWAY_SECONDS)?;
        let engine = ForwardingEngine::new(TEST_UPSTREAM_TIMEOUT)?;

        let state = Arc::new(AppState {
            route_table,
            validator,
            engine,
        });

        let app = build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            // The server runs until the test process exits or the task is
            // aborted with the harness drop.
            let _ = axum::serve(listener, app).await;
        });

        Ok(TestGateway {
            addr,
            _handle: handle,
        })
    }

    /// Base URL of the running gateway.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Socket address the gateway is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
