//! Middleware applied at the router level.
//!
//! Provides rate limiting and observability middleware.

pub mod rate_limit;
pub mod tracing;
