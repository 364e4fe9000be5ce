//! Shared types, errors, and configuration for Vouch.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Application configuration loaded once at startup
//! - The application-wide error taxonomy
//! - Token claims and request/response payloads
//! - JWT issuance and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod jwt_tests;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService, TOKEN_LIFETIME_SECS};
