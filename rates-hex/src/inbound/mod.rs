//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the query service.

mod handlers;
mod server;

pub use handlers::{AppState, ApiError};
pub use server::HttpServer;
