//! Grant server.
//!
//! The [`Server`] owns the grant registry and storage handles and turns a
//! [`GrantRequest`] into a finished [`Session`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::OAuthResult;
use crate::config::{ConfigError, ServerConfig};
use crate::error::OAuthError;
use crate::grant::Grant;
use crate::persistence::{PersistenceEvent, SessionPersister};
use crate::request::{GrantRequest, params};
use crate::storage::{ClientStorage, OwnerStorage, ScopeStorage, SessionStorage};
use crate::token::{DefaultTokenGenerator, TokenGenerator};
use crate::types::Session;

/// OAuth2 grant server.
///
/// Register grants at startup, then share the server (for example behind an
/// `Arc`) and call [`Server::grant_oauth_session`] per token request.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use octogrant::prelude::*;
///
/// let server = Server::new(clients, owners, sessions, scopes)
///     .with_grant(Arc::new(ClientCredentialsGrant::new()))
///     .with_grant(Arc::new(RefreshTokenGrant::new().with_rotation(true)));
///
/// let request = BasicGrantRequest::new("client_credentials")
///     .with("client_id", "c1")
///     .with("client_secret", "secret");
/// let session = server.grant_oauth_session(&request).await?;
/// ```
pub struct Server {
    config: ServerConfig,
    grants: HashMap<String, Arc<dyn Grant>>,
    token_generator: Arc<dyn TokenGenerator>,
    client_storage: Arc<dyn ClientStorage>,
    owner_storage: Arc<dyn OwnerStorage>,
    session_storage: Arc<dyn SessionStorage>,
    scope_storage: Arc<dyn ScopeStorage>,
    persister: SessionPersister,
}

impl Server {
    /// Creates a server with default configuration and no grants.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        owner_storage: Arc<dyn OwnerStorage>,
        session_storage: Arc<dyn SessionStorage>,
        scope_storage: Arc<dyn ScopeStorage>,
    ) -> Self {
        let config = ServerConfig::default();
        let persister = SessionPersister::new(session_storage.clone(), config.persistence.clone());

        Self {
            config,
            grants: HashMap::new(),
            token_generator: Arc::new(DefaultTokenGenerator::new()),
            client_storage,
            owner_storage,
            session_storage,
            scope_storage,
            persister,
        }
    }

    /// Replaces the configuration.
    ///
    /// `allow_refresh` stays on if a registered grant requires it. Existing
    /// persistence subscriptions are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `config` fails validation. The
    /// server is consumed in that case.
    pub fn with_config(mut self, mut config: ServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if self.grants.values().any(|g| g.enables_refresh()) {
            config.allow_refresh = true;
        }
        self.persister =
            SessionPersister::new(self.session_storage.clone(), config.persistence.clone());
        self.config = config;
        Ok(self)
    }

    /// Replaces the token generator.
    #[must_use]
    pub fn with_token_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.token_generator = generator;
        self
    }

    /// Registers a grant.
    #[must_use]
    pub fn with_grant(mut self, grant: Arc<dyn Grant>) -> Self {
        self.add_grant(grant);
        self
    }

    /// Registers a grant under its name, replacing any grant of that name.
    ///
    /// A grant that consumes refresh tokens turns on `allow_refresh`.
    pub fn add_grant(&mut self, grant: Arc<dyn Grant>) -> &mut Self {
        if grant.enables_refresh() {
            self.config.allow_refresh = true;
        }
        tracing::debug!(grant = %grant.name(), "Registered grant");
        self.grants.insert(grant.name().to_string(), grant);
        self
    }

    /// Returns the grant registered under `name`.
    #[must_use]
    pub fn grant(&self, name: &str) -> Option<&Arc<dyn Grant>> {
        self.grants.get(name)
    }

    /// Returns `true` if a grant is registered under `name`.
    #[must_use]
    pub fn has_grant(&self, name: &str) -> bool {
        self.grants.contains_key(name)
    }

    /// Returns registered grant names in sorted order.
    #[must_use]
    pub fn grants(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the token generator.
    #[must_use]
    pub fn token_generator(&self) -> &dyn TokenGenerator {
        self.token_generator.as_ref()
    }

    /// Returns the client storage.
    #[must_use]
    pub fn client_storage(&self) -> &dyn ClientStorage {
        self.client_storage.as_ref()
    }

    /// Returns the owner storage.
    #[must_use]
    pub fn owner_storage(&self) -> &dyn OwnerStorage {
        self.owner_storage.as_ref()
    }

    /// Returns the session storage.
    #[must_use]
    pub fn session_storage(&self) -> &dyn SessionStorage {
        self.session_storage.as_ref()
    }

    /// Returns the scope storage.
    #[must_use]
    pub fn scope_storage(&self) -> &dyn ScopeStorage {
        self.scope_storage.as_ref()
    }

    /// Subscribe to background persistence outcomes.
    #[must_use]
    pub fn subscribe_persistence(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.persister.subscribe()
    }

    /// Runs a token request through its grant and returns the issued session.
    ///
    /// The session is saved in the background; the outcome is reported
    /// through [`Server::subscribe_persistence`], not here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no grant is registered for the request (`GrantNotFound`)
    /// - the grant rejects the request
    /// - a requested scope cannot be resolved (`InvalidScope`)
    pub async fn grant_oauth_session(&self, request: &dyn GrantRequest) -> OAuthResult<Session> {
        // 1. Find the grant
        let grant_name = request.grant();
        let grant = self.grants.get(grant_name).ok_or_else(|| {
            tracing::debug!(grant = %grant_name, "Unknown grant requested");
            OAuthError::grant_not_found(grant_name)
        })?;

        // 2. Let the grant authenticate and build the session
        let mut session = grant
            .generate_session(request, self)
            .await
            .map_err(OAuthError::from_grant_failure)
            .inspect_err(|e| {
                tracing::debug!(grant = %grant_name, error = %e, "Grant rejected request");
            })?;

        // 3. Mint tokens
        if session.access_token.is_none() {
            session.access_token = Some(
                self.token_generator
                    .generate_access_token(&self.config, grant.as_ref()),
            );
        }

        if self.config.allow_refresh && grant.should_generate_refresh_token(&session) {
            session.refresh_token = Some(
                self.token_generator
                    .generate_refresh_token(&self.config, grant.as_ref()),
            );
        }

        // 4. Resolve requested scopes
        let requested = request.get(params::SCOPES);
        if !requested.is_empty() {
            let mut scopes = HashMap::with_capacity(requested.len());
            for name in requested {
                let scope = self
                    .scope_storage
                    .find_scope_by_name(name)
                    .await
                    .map_err(|e| OAuthError::invalid_scope_with_source(name, e))?;
                scopes.insert(name.clone(), scope);
            }
            session.scopes = scopes;
        }

        // 5. Grant-specific post-processing
        if let Some(processor) = grant.post_processor() {
            processor.process_session(&mut session);
        }

        // 6. Persist in the background
        self.persister.dispatch(session.clone());

        tracing::info!(
            grant = %grant_name,
            client_id = %session.client.id,
            session_id = %session.id,
            refresh_issued = session.refresh_token.is_some(),
            "Session granted"
        );

        Ok(session)
    }
}
