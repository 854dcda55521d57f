//! Scope storage trait.

use async_trait::async_trait;

use super::StorageResult;
use crate::types::Scope;

/// Resolution of scope names to scopes.
#[async_trait]
pub trait ScopeStorage: Send + Sync {
    /// Find a scope by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the scope is unknown.
    async fn find_scope_by_name(&self, name: &str) -> StorageResult<Scope>;
}
