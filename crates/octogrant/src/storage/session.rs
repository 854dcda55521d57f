//! Session storage trait.

use async_trait::async_trait;

use super::StorageResult;
use crate::types::Session;

// =============================================================================
// Session Storage Trait
// =============================================================================

/// Persistence of issued sessions.
///
/// Expiration is enforced here: lookups must not return a session whose
/// matching token has expired.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Find the session owning an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session holds this access token
    /// - The access token has expired
    /// - The storage operation fails
    async fn find_session_by_access_token(&self, token: &str) -> StorageResult<Session>;

    /// Find the session owning a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session holds this refresh token
    /// - The refresh token has expired
    /// - The storage operation fails
    async fn find_session_by_refresh_token(&self, token: &str) -> StorageResult<Session>;

    /// Insert or replace a session.
    ///
    /// Saving a session under an existing id replaces the stored one,
    /// including its tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save_session(&self, session: &Session) -> StorageResult<()>;

    /// Delete a session by id.
    ///
    /// Deleting a session that doesn't exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_session(&self, id: &str) -> StorageResult<()>;
}
