//! Faultline server library
//!
//! Exposes the router assembly and configuration so integration tests can
//! drive the full HTTP surface without binding a socket.

pub mod app;
pub mod config;

pub use app::{app_router, AppState};
pub use config::ServerConfig;
