//! Resource owner storage trait.

use async_trait::async_trait;

use super::StorageResult;
use crate::types::Owner;

/// Lookup and authentication of resource owners.
#[async_trait]
pub trait OwnerStorage: Send + Sync {
    /// Find an owner by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such owner exists.
    async fn find_owner_by_username(&self, username: &str) -> StorageResult<Owner>;

    /// Authenticate an owner by username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The owner doesn't exist
    /// - The password doesn't match
    /// - The storage operation fails
    async fn find_owner_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> StorageResult<Owner>;

    /// Reload an owner from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner no longer exists or the storage
    /// operation fails.
    async fn refresh_owner(&self, owner: &Owner) -> StorageResult<Owner>;
}
