use gateway_service::auth::TokenValidator;
use gateway_service::config::{Config, ConfigError};
use gateway_service::proxy::ForwardingEngine;
use gateway_service::routes::{self, AppState};
use gateway_service::routing::RouteTable;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tier gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    // Load the route table
    let route_table = RouteTable::load(&config.routes_file).map_err(|e| {
        error!("Failed to load route table: {}", e);
        e
    })?;

    // Load the verification key
    let public_key_pem = std::fs::read_to_string(&config.public_key_file).map_err(|source| {
        let e = ConfigError::UnreadableFile {
            path: config.public_key_file.clone(),
            source,
        };
        error!("Failed to read verification key: {}", e);
        e
    })?;

    let validator =
        TokenValidator::from_pem(&public_key_pem, config.jwt_leeway_seconds).map_err(|e| {
            error!("Failed to load verification key: {}", e);
            e
        })?;

    info!("Verification key loaded");

    // Build the forwarding engine
    let engine = ForwardingEngine::new(config.upstream_timeout).map_err(|e| {
        error!("Failed to build forwarding engine: {}", e);
        e
    })?;

    // Create application state
    let state = Arc::new(AppState {
        route_table,
        validator,
        engine,
    });

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Tier gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
