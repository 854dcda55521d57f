//! Client storage trait.

use async_trait::async_trait;

use super::StorageResult;
use crate::types::Client;

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Lookup and authentication of registered clients.
///
/// # Example
///
/// ```ignore
/// use octogrant::storage::ClientStorage;
///
/// async fn example(storage: &dyn ClientStorage) {
///     let client = storage.find_client_by_id_and_secret("my-app", "s3cret").await?;
///     println!("Authenticated client: {}", client.name);
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such client exists.
    async fn find_client_by_id(&self, id: &str) -> StorageResult<Client>;

    /// Authenticate a client.
    ///
    /// # Arguments
    ///
    /// * `id` - The client identifier
    /// * `secret` - The plaintext secret presented by the client
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client doesn't exist
    /// - The secret doesn't match
    /// - The storage operation fails
    async fn find_client_by_id_and_secret(&self, id: &str, secret: &str) -> StorageResult<Client>;

    /// Reload a client from storage.
    ///
    /// Used when a stored session is refreshed, so the session reflects the
    /// client's current registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client no longer exists or the storage
    /// operation fails.
    async fn refresh_client(&self, client: &Client) -> StorageResult<Client>;
}
