//! # ecodeli-api
//!
//! HTTP API layer for EcoDeli built on Axum.
//!
//! Provides the REST endpoints, middleware (CORS, request logging),
//! extractors (bearer auth, validated JSON, pagination), DTOs, and the
//! mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
