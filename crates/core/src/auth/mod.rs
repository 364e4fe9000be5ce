//! Authentication and password handling.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification, including a dummy verification for unknown users
//! - The password and email rules credential stores enforce on signup

mod password;
mod policy;

pub use password::{
    PasswordError, equalize_verification, hash_password, hash_password_blocking,
    verify_password, verify_password_blocking,
};
pub use policy::{PasswordPolicy, normalize_email, validate_email};
