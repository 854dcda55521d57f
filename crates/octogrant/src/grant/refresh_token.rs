//! Refresh Token grant.

use async_trait::async_trait;

use super::{Grant, GrantResult, GrantSettings, authenticate_client, required_value};
use crate::error::{OAuthError, StorageError};
use crate::request::{GrantRequest, params};
use crate::server::Server;
use crate::types::{GrantType, Session};

/// Exchanges a refresh token for a new access token on the same session.
///
/// Registering this grant turns on refresh token issuance for the server.
/// Requested scopes may narrow the session's scopes but never widen them.
#[derive(Debug, Clone, Default)]
pub struct RefreshTokenGrant {
    settings: GrantSettings,
    rotate_refresh_tokens: bool,
    refresh_client_and_owner: bool,
}

impl RefreshTokenGrant {
    /// Creates the grant without rotation or identity refresh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the grant with the given settings.
    #[must_use]
    pub fn with_settings(settings: GrantSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Overrides the access token lifetime for this grant.
    #[must_use]
    pub fn with_access_token_expiration(mut self, seconds: i64) -> Self {
        self.settings.access_token_expiration = seconds;
        self
    }

    /// Issues a new refresh token on every refresh, dropping the old one.
    #[must_use]
    pub fn with_rotation(mut self, rotate: bool) -> Self {
        self.rotate_refresh_tokens = rotate;
        self
    }

    /// Reloads the session's client and owner from storage on every refresh.
    #[must_use]
    pub fn with_client_and_owner_refresh(mut self, refresh: bool) -> Self {
        self.refresh_client_and_owner = refresh;
        self
    }

    /// Returns `true` if refresh tokens are rotated.
    #[must_use]
    pub fn rotates_refresh_tokens(&self) -> bool {
        self.rotate_refresh_tokens
    }

    /// Returns `true` if client and owner are reloaded on refresh.
    #[must_use]
    pub fn refreshes_client_and_owner(&self) -> bool {
        self.refresh_client_and_owner
    }

    async fn reload_identities(
        &self,
        session: &mut Session,
        server: &Server,
    ) -> Result<(), OAuthError> {
        let client = server
            .client_storage()
            .refresh_client(&session.client)
            .await
            .map_err(|e| OAuthError::storage_search_failed("client", e))?;
        if client.id != session.client.id {
            return Err(OAuthError::storage_search_failed(
                "client",
                StorageError::identity_mismatch("client", &session.client.id, client.id),
            ));
        }

        let owner = server
            .owner_storage()
            .refresh_owner(&session.owner)
            .await
            .map_err(|e| OAuthError::storage_search_failed("owner", e))?;
        if owner.id != session.owner.id {
            return Err(OAuthError::storage_search_failed(
                "owner",
                StorageError::identity_mismatch("owner", &session.owner.id, owner.id),
            ));
        }

        session.client = client;
        session.owner = owner;
        Ok(())
    }
}

#[async_trait]
impl Grant for RefreshTokenGrant {
    fn name(&self) -> &str {
        GrantType::RefreshToken.as_str()
    }

    fn settings(&self) -> &GrantSettings {
        &self.settings
    }

    async fn generate_session(
        &self,
        request: &dyn GrantRequest,
        server: &Server,
    ) -> GrantResult<Session> {
        // 1. Authenticate the client
        let client = authenticate_client(request, server.client_storage()).await?;

        // 2. Load the session holding the refresh token
        let refresh_token = required_value(request, params::REFRESH_TOKEN)?;
        let mut session = server
            .session_storage()
            .find_session_by_refresh_token(refresh_token)
            .await
            .map_err(|e| {
                tracing::debug!(client_id = %client.id, error = %e, "Refresh token lookup failed");
                OAuthError::storage_search_failed("session", e)
            })?;

        // 3. The session must belong to the authenticated client
        if session.client.id != client.id {
            tracing::warn!(
                client_id = %client.id,
                session_id = %session.id,
                "Refresh token presented by a different client"
            );
            return Err(OAuthError::storage_search_failed(
                "session",
                StorageError::identity_mismatch("client", &session.client.id, &client.id),
            )
            .into());
        }

        // 4. Optionally reload client and owner
        if self.refresh_client_and_owner {
            self.reload_identities(&mut session, server).await?;
        }

        // 5. Requested scopes must already be granted
        for name in request.get(params::SCOPES) {
            if !session.has_scope(name) {
                return Err(OAuthError::invalid_scope(name).into());
            }
        }

        // 6. Clear tokens so the server mints new ones
        session.access_token = None;
        if self.rotate_refresh_tokens {
            session.refresh_token = None;
        }

        Ok(session)
    }

    fn should_generate_refresh_token(&self, _session: &Session) -> bool {
        self.rotate_refresh_tokens
    }

    fn enables_refresh(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::BasicGrantRequest;
    use crate::test_utils::{MockStorage, server_with, stored_session};
    use crate::types::{Client, Owner};

    fn request(token: &str) -> BasicGrantRequest {
        BasicGrantRequest::new("refresh_token")
            .with(params::CLIENT_ID, "c1")
            .with(params::CLIENT_SECRET, "secret")
            .with(params::REFRESH_TOKEN, token)
    }

    #[tokio::test]
    async fn test_clears_access_token_only() {
        let storage = MockStorage::new();
        let stored = stored_session(&storage, "rt-1", &["read", "write"]);
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new();

        let session = grant.generate_session(&request("rt-1"), &server).await.unwrap();
        assert_eq!(session.id, stored.id);
        assert!(session.access_token.is_none());
        assert_eq!(session.refresh_token, stored.refresh_token);
        assert!(!grant.should_generate_refresh_token(&session));
    }

    #[tokio::test]
    async fn test_rotation_clears_refresh_token() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new().with_rotation(true);

        let session = grant.generate_session(&request("rt-1"), &server).await.unwrap();
        assert!(session.access_token.is_none());
        assert!(session.refresh_token.is_none());
        assert!(grant.should_generate_refresh_token(&session));
    }

    #[tokio::test]
    async fn test_missing_refresh_token() {
        let server = server_with(MockStorage::new());
        let grant = RefreshTokenGrant::new();
        let request = BasicGrantRequest::new("refresh_token")
            .with(params::CLIENT_ID, "c1")
            .with(params::CLIENT_SECRET, "secret");

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request, &server).await.unwrap_err(),
        );
        assert!(
            matches!(err, OAuthError::RequiredValueMissing { ref name } if name == "refresh_token")
        );
    }

    #[tokio::test]
    async fn test_unknown_refresh_token() {
        let server = server_with(MockStorage::new());
        let grant = RefreshTokenGrant::new();

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request("nope"), &server).await.unwrap_err(),
        );
        assert!(matches!(
            err,
            OAuthError::StorageSearchFailed { ref entity, .. } if entity == "session"
        ));
    }

    #[tokio::test]
    async fn test_scope_must_be_granted() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &["read"]);
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new();

        let err = OAuthError::from_grant_failure(
            grant
                .generate_session(&request("rt-1").with(params::SCOPES, "write"), &server)
                .await
                .unwrap_err(),
        );
        assert!(matches!(err, OAuthError::InvalidScope { ref name, .. } if name == "write"));

        let session = grant
            .generate_session(&request("rt-1").with(params::SCOPES, "read"), &server)
            .await
            .unwrap();
        assert!(session.has_scope("read"));
    }

    #[tokio::test]
    async fn test_session_of_other_client_rejected() {
        let storage = MockStorage::new();
        storage.add_client(Client::new("c2", "other"), "secret2");
        stored_session(&storage, "rt-1", &[]);
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new();
        let request = BasicGrantRequest::new("refresh_token")
            .with(params::CLIENT_ID, "c2")
            .with(params::CLIENT_SECRET, "secret2")
            .with(params::REFRESH_TOKEN, "rt-1");

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request, &server).await.unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::StorageSearchFailed);
        assert!(matches!(
            err.storage_error(),
            Some(StorageError::IdentityMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_reload_identities_picks_up_changes() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        storage.add_client(Client::new("c1", "renamed"), "secret");
        storage.add_owner("alice", "wonderland", Owner::new("o1", "Alice Liddell"));
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new().with_client_and_owner_refresh(true);

        let session = grant.generate_session(&request("rt-1"), &server).await.unwrap();
        assert_eq!(session.client.name, "renamed");
        assert_eq!(session.owner.name, "Alice Liddell");
    }

    #[tokio::test]
    async fn test_reload_identities_missing_owner() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        storage.remove_owner("alice");
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new().with_client_and_owner_refresh(true);

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request("rt-1"), &server).await.unwrap_err(),
        );
        assert!(matches!(
            err,
            OAuthError::StorageSearchFailed { ref entity, .. } if entity == "owner"
        ));
    }

    #[tokio::test]
    async fn test_reload_identities_rejects_changed_client_id() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        storage.reassign_id("c1", "c9");
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new().with_client_and_owner_refresh(true);

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request("rt-1"), &server).await.unwrap_err(),
        );
        match err {
            OAuthError::StorageSearchFailed { entity, source } => {
                assert_eq!(entity, "client");
                assert_eq!(source, StorageError::identity_mismatch("client", "c1", "c9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reload_identities_rejects_changed_owner_id() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        storage.reassign_id("o1", "o2");
        let server = server_with(storage);
        let grant = RefreshTokenGrant::new().with_client_and_owner_refresh(true);

        let err = OAuthError::from_grant_failure(
            grant.generate_session(&request("rt-1"), &server).await.unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::StorageSearchFailed);
        match err {
            OAuthError::StorageSearchFailed { entity, source } => {
                assert_eq!(entity, "owner");
                assert_eq!(source, StorageError::identity_mismatch("owner", "o1", "o2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_identity_ids_checked_only_when_reloading() {
        let storage = MockStorage::new();
        stored_session(&storage, "rt-1", &[]);
        storage.reassign_id("c1", "c9");
        let server = server_with(storage);

        let session = RefreshTokenGrant::new()
            .generate_session(&request("rt-1"), &server)
            .await
            .unwrap();
        assert_eq!(session.client.id, "c1");
    }

    #[test]
    fn test_flags() {
        let grant = RefreshTokenGrant::new()
            .with_rotation(true)
            .with_client_and_owner_refresh(true);
        assert_eq!(grant.name(), "refresh_token");
        assert!(grant.enables_refresh());
        assert!(grant.rotates_refresh_tokens());
        assert!(grant.refreshes_client_and_owner());
    }
}
