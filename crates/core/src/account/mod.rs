//! Accounts and their avatars.
//!
//! [`AccountService`] is the entry point; [`CredentialStore`] is the seam
//! to user persistence.

mod avatar;
pub mod memory;
mod service;
mod store;
mod types;


pub use avatar::AvatarManager;
pub use memory::InMemoryCredentialStore;
pub use service::AccountService;
pub use store::{CredentialError, CredentialStore};
pub use types::{
    AvatarUpdate, Identity, NewUser, PreviousAvatar, StoredObject, UploadedFile, User,
};
