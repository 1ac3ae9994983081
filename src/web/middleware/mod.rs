//! Web middleware.
//!
//! - [`session`] - Cookie session resolution and the login gate

pub mod session;
