//! Upline API - HTTP surface for the referral and settlement engines
//!
//! Exposes balance reads, referral listings, rank status and claims, the
//! transaction lifecycle, and the distribution trigger over axum. All
//! domain behavior lives in `upline-core`; handlers translate between
//! HTTP and the engines.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::{build_app, create_router, create_v1_router};
pub use state::{ApiConfig, AppState};
