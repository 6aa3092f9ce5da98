//! HTTP classification service for the command palette.
//!
//! Serves `POST /command`: classifies a prompt into an intent with the
//! keyword classifier, under a per-client daily command limit.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use rate_limit::DailyRateLimiter;
pub use routes::{create_router, serve, start_server};
pub use state::AppState;
