//! Request forwarding to tier backends.

pub mod engine;

pub use engine::{ForwardError, ForwardingEngine};
