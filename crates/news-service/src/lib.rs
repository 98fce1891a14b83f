//! # news-service
//!
//! The news clustering pipeline and its HTTP API.
//!
//! - [`NewsClusteringService`] runs embed → cluster → representatives →
//!   summarize for one batch of articles
//! - [`api`] exposes the service over axum
//! - [`run_server_with_shutdown`] serves the API until a shutdown signal

pub mod api;
pub mod error;
pub mod pipeline;
pub mod server;

pub use api::{create_router, ApiConfig, ApiError, AppState};
pub use error::ServiceError;
pub use pipeline::NewsClusteringService;
pub use server::{run_server_with_shutdown, serve_listener};
