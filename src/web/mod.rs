//! Server-rendered site.
//!
//! # Modules
//!
//! - [`handlers`] - Page handlers
//! - [`middleware`] - Cookie sessions and the login gate
//! - [`forms`] - Query strings and form payloads
//! - [`views`] - View models and Askama templates
//! - [`routes`] - Route tables

pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod views;
