//! Local identity provider for Campus: email/password accounts with
//! bcrypt-hashed passwords, kept in process memory.

pub mod strategy;

pub use strategy::{LocalIdentity, LocalIdentityOptions};
