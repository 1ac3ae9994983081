//! Machine-facing HTTP surface and the middleware shared by every route.
//!
//! # Modules
//!
//! - [`dto`] - JSON response bodies
//! - [`handlers`] - JSON endpoints (health)
//! - [`middleware`] - Rate limiting and request tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
