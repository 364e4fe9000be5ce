//! Core account and avatar logic for Vouch.
//!
//! This crate contains the business rules with ZERO web or database
//! dependencies. Persistence of user records sits behind the
//! [`account::CredentialStore`] trait; the db crate provides the Postgres
//! implementation and [`account::memory`] an in-process one.
//!
//! # Modules
//!
//! - `auth` - Password hashing and password policy
//! - `storage` - Vendor-agnostic object storage over OpenDAL
//! - `account` - Signup, signin, and the avatar lifecycle

pub mod account;
pub mod auth;
pub mod storage;
