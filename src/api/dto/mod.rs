//! JSON response bodies.

pub mod health;
