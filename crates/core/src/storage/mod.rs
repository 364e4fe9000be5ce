//! Object storage for profile images using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - Process memory (tests)
//!
//! Containers are path prefixes inside the configured bucket or root, and
//! every object is addressed as `{container}/{key}`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.create_dir("c/")        │ op.exists("c/key")                 │
//! │ op.write("c/key", data)    │ op.delete("c/key")                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod key;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use key::{avatar_key, sanitize_filename};
pub use service::StorageService;
