//! API route definitions.

pub mod auth;
pub mod health;
