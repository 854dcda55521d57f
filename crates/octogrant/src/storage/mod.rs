//! Storage traits consumed by the grant engine.
//!
//! This module defines storage interfaces for:
//!
//! - Client lookup and authentication
//! - Resource owner lookup and authentication
//! - Session persistence and token lookup
//! - Scope resolution
//!
//! Every lookup reports a miss as an error, never as an empty value.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `octogrant-memory` - in-memory storage for tests and single-process use

pub mod client;
pub mod owner;
pub mod scope;
pub mod session;

pub use client::ClientStorage;
pub use owner::OwnerStorage;
pub use scope::ScopeStorage;
pub use session::SessionStorage;

use crate::error::StorageError;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
