//! Resource Owner Password Credentials grant.

use async_trait::async_trait;

use super::{Grant, GrantResult, GrantSettings, authenticate_client, required_value};
use crate::error::OAuthError;
use crate::request::{GrantRequest, params};
use crate::server::Server;
use crate::types::{GrantType, Session};

/// The client exchanges the owner's username and password for a token.
///
/// Always asks for a refresh token. Whether one is minted depends on the
/// server's `allow_refresh` setting.
#[derive(Debug, Clone, Default)]
pub struct PasswordGrant {
    settings: GrantSettings,
}

impl PasswordGrant {
    /// Creates the grant with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the grant with the given settings.
    #[must_use]
    pub fn with_settings(settings: GrantSettings) -> Self {
        Self { settings }
    }

    /// Overrides the access token lifetime for this grant.
    #[must_use]
    pub fn with_access_token_expiration(mut self, seconds: i64) -> Self {
        self.settings.access_token_expiration = seconds;
        self
    }
}

#[async_trait]
impl Grant for PasswordGrant {
    fn name(&self) -> &str {
        GrantType::Password.as_str()
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

        // 2. Authenticate the owner
        let username = required_value(request, params::USERNAME)?;
        let password = required_value(request, params::PASSWORD)?;

        let owner = server
            .owner_storage()
            .find_owner_by_username_and_password(username, password)
            .await
            .map_err(|e| {
                tracing::debug!(
                    client_id = %client.id,
                    error = %e,
                    "Owner authentication failed"
                );
                OAuthError::storage_search_failed("owner", e)
            })?;

        Ok(Session::new(client, owner))
    }

    fn should_generate_refresh_token(&self, _session: &Session) -> bool {
        true
    }
}
