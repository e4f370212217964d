//! GameOn REST API server.
//!
//! Wires the core [`gameon`] managers into an axum router; the binary in
//! `main.rs` handles CLI flags, configuration, and serving.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
