//! In-memory storage backend for octogrant.
//!
//! This crate implements every storage trait from `octogrant::storage` on
//! top of `dashmap`, for tests and single-process deployments. Nothing is
//! persisted across restarts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use octogrant::prelude::*;
//! use octogrant_memory::{
//!     InMemoryOwnerClientStorage, InMemoryScopeStorage, InMemorySessionStorage,
//! };
//!
//! let identities = Arc::new(InMemoryOwnerClientStorage::new());
//! identities.add_client(Client::new("c1", "My App"), "s3cret");
//!
//! let server = Server::new(
//!     identities.clone(),
//!     identities,
//!     Arc::new(InMemorySessionStorage::new()),
//!     Arc::new(InMemoryScopeStorage::new()),
//! )
//! .with_grant(Arc::new(ClientCredentialsGrant::new()));
//! ```

pub mod identity;
pub mod scope;
pub mod session;

pub use identity::InMemoryOwnerClientStorage;
pub use scope::InMemoryScopeStorage;
pub use session::InMemorySessionStorage;

/// Hashes a client secret or owner password for storage.
///
/// SHA-256, hex encoded (64 characters).
pub(crate) fn hash_secret(secret: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
