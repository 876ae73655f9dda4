//! Plam Backend Library
//!
//! Exposes the store, token machinery and HTTP router for the `plam` binary
//! and the integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod middleware;

pub use api::{router, AppState};
pub use config::Config;
