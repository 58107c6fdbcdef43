//! # Gateway Test Utilities
//!
//! Shared test utilities for the tier gateway.
//!
//! This crate provides:
//! - Fixed RSA keypairs for reproducible signature tests
//! - A token builder minting RS256 (and deliberately-wrong) tokens
//! - A server harness spawning a real gateway on an ephemeral port
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gw_test_utils::{TestGateway, TestTokenBuilder};
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let gateway = TestGateway::spawn(&[("gold", "http://127.0.0.1:9001")]).await?;
//!     let token = TestTokenBuilder::new().with_tier("gold").mint();
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/orders", gateway.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
