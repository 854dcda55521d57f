//! Grant types.
//!
//! A grant authenticates a token request and produces a partial
//! [`Session`]: client and owner set, tokens possibly cleared. The
//! [`Server`] finishes the session by minting tokens and resolving scopes.
//!
//! Built-in grants:
//!
//! - [`ClientCredentialsGrant`] - the client acts on its own behalf
//! - [`PasswordGrant`] - resource owner username and password
//! - [`RefreshTokenGrant`] - exchange a refresh token for a new access token

pub mod client_credentials;
pub mod password;
pub mod refresh_token;

pub use client_credentials::ClientCredentialsGrant;
pub use password::PasswordGrant;
pub use refresh_token::RefreshTokenGrant;

use async_trait::async_trait;

use crate::error::{BoxError, OAuthError};
use crate::request::{GrantRequest, params};
use crate::server::Server;
use crate::storage::ClientStorage;
use crate::types::{Client, Session};

/// Result type returned by grants.
///
/// Grants may fail with any error; the server classifies it.
pub type GrantResult<T> = Result<T, BoxError>;

// =============================================================================
// Grant Settings
// =============================================================================

/// Settings shared by every grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantSettings {
    /// Access token lifetime in seconds. Zero means the server default.
    pub access_token_expiration: i64,
}

impl GrantSettings {
    /// Creates settings with the given access token lifetime.
    #[must_use]
    pub fn new(access_token_expiration: i64) -> Self {
        Self {
            access_token_expiration,
        }
    }
}

// =============================================================================
// Grant Traits
// =============================================================================

/// A token grant type.
#[async_trait]
pub trait Grant: Send + Sync {
    /// Name the grant is registered and requested under.
    fn name(&self) -> &str;

    /// Settings shared with every other grant.
    fn settings(&self) -> &GrantSettings;

    /// Authenticates the request and builds a session.
    ///
    /// # Errors
    ///
    /// Returns an [`OAuthError`] for classified failures. Any other error is
    /// reported to the caller as [`OAuthError::Unexpected`].
    async fn generate_session(
        &self,
        request: &dyn GrantRequest,
        server: &Server,
    ) -> GrantResult<Session>;

    /// Access token lifetime in seconds. Zero means the server default.
    fn access_token_expiration(&self) -> i64 {
        self.settings().access_token_expiration
    }

    /// Whether the server should mint a refresh token for this session.
    fn should_generate_refresh_token(&self, _session: &Session) -> bool {
        false
    }

    /// Whether registering this grant turns on refresh token issuance.
    fn enables_refresh(&self) -> bool {
        false
    }

    /// Hook run on the finished session, if this grant has one.
    fn post_processor(&self) -> Option<&dyn PostProcessingGrant> {
        None
    }
}

/// A grant that adjusts the session after tokens and scopes are filled in.
pub trait PostProcessingGrant: Send + Sync {
    /// Adjusts the session before it is persisted and returned.
    fn process_session(&self, session: &mut Session);
}

// =============================================================================
// Helpers
// =============================================================================

/// Returns the first non-empty value of a mandatory request field.
///
/// # Errors
///
/// Returns `OAuthError::RequiredValueMissing` if the field is absent or empty.
pub fn required_value<'a>(
    request: &'a dyn GrantRequest,
    name: &str,
) -> Result<&'a str, OAuthError> {
    match request.get_first(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(OAuthError::required_value_missing(name)),
    }
}

/// Authenticates the requesting client.
///
/// # Errors
///
/// Returns an error if:
/// - `client_id` or `client_secret` is missing (`RequiredValueMissing`)
/// - storage rejects the credentials (`StorageSearchFailed` for `client`)
pub async fn authenticate_client(
    request: &dyn GrantRequest,
    storage: &dyn ClientStorage,
) -> Result<Client, OAuthError> {
    let client_id = required_value(request, params::CLIENT_ID)?;
    let client_secret = required_value(request, params::CLIENT_SECRET)?;

    storage
        .find_client_by_id_and_secret(client_id, client_secret)
        .await
        .map_err(|e| {
            tracing::debug!(client_id = %client_id, error = %e, "Client authentication failed");
            OAuthError::storage_search_failed("client", e)
        })
}
