//! Small helpers shared by services and handlers.
//!
//! - [`token`] - Session token generation
//! - [`password`] - Argon2 password hashing
//! - [`next_url`] - Login redirects carrying a `next` target

pub mod next_url;
pub mod password;
pub mod token;
