//! REST API server and endpoints.
//!
//! This crate exposes the estimator over HTTP:
//! - Pool-based estimation (`POST /lp/estimate`)
//! - Position-based calculation (`POST /lp/calculate`)
//! - Health check and supported-chain listing
//! - x402 micropayment manifests and the gated agent entrypoint

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// x402 payment gate and protocol manifests.
pub mod payment;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::ApiError;
pub use payment::PaymentConfig;
pub use routes::build_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
