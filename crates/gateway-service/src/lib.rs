//! Tier gateway library.
//!
//! An authenticating reverse proxy: inbound requests present an RSA-signed
//! bearer token, the gateway verifies it against a public key loaded at
//! startup, reads the `tier` claim, resolves the tier to a backend base
//! URL through an immutable route table, and relays the request/response
//! pair transparently.
//!
//! # Modules
//!
//! - [`config`] - environment-based configuration, fatal startup errors
//! - [`auth`] - bearer-token validation and tier resolution
//! - [`routing`] - the immutable tier route table
//! - [`proxy`] - the forwarding engine
//! - [`handlers`] - health probe and the dispatch pipeline
//! - [`routes`] - router construction and shared state
//! - [`errors`] - request-scoped error taxonomy and wire mapping

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod proxy;
pub mod routes;
pub mod routing;
