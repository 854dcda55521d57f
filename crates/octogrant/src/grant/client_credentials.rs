//! Client Credentials grant.

use async_trait::async_trait;

use super::{Grant, GrantResult, GrantSettings, authenticate_client};
use crate::request::GrantRequest;
use crate::server::Server;
use crate::types::{GrantType, Owner, Session};

/// The client requests a token on its own behalf.
///
/// The session owner is the client itself. No refresh token is issued.
#[derive(Debug, Clone, Default)]
pub struct ClientCredentialsGrant {
    settings: GrantSettings,
}

impl ClientCredentialsGrant {
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
impl Grant for ClientCredentialsGrant {
    fn name(&self) -> &str {
        GrantType::ClientCredentials.as_str()
    }

    fn settings(&self) -> &GrantSettings {
        &self.settings
    }

    async fn generate_session(
        &self,
        request: &dyn GrantRequest,
        server: &Server,
    ) -> GrantResult<Session> {
        let client = authenticate_client(request, server.client_storage()).await?;
        let owner = Owner::from_client(&client);

        Ok(Session::new(client, owner))
    }
}
