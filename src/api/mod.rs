//! HTTP API Module
//!
//! Request layer for the boot node: peer registration and discovery,
//! health, status and metrics endpoints.

mod metrics;
mod rate_limit;
mod routes;

pub use metrics::Metrics;
pub use rate_limit::RateLimiter;
pub use routes::{build_router, run_api_server, ApiState};
