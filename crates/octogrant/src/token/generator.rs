//! Access and refresh token minting.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::grant::Grant;
use crate::types::{NO_EXPIRATION, Token};

/// Produces opaque token identifiers.
pub type TokenIdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Generates a random token identifier.
///
/// A v4 UUID encoded as unpadded base64url (22 characters).
#[must_use]
pub fn generate_token_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

/// Mints tokens for sessions.
pub trait TokenGenerator: Send + Sync {
    /// Mints an access token.
    ///
    /// The lifetime is the grant's own setting when nonzero, otherwise the
    /// configured default.
    fn generate_access_token(&self, config: &ServerConfig, grant: &dyn Grant) -> Token;

    /// Mints a refresh token with the configured default lifetime.
    fn generate_refresh_token(&self, config: &ServerConfig, grant: &dyn Grant) -> Token;
}

/// Default [`TokenGenerator`].
#[derive(Clone)]
pub struct DefaultTokenGenerator {
    id_generator: TokenIdGenerator,
}

impl DefaultTokenGenerator {
    /// Creates a generator using [`generate_token_id`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            id_generator: Arc::new(generate_token_id),
        }
    }

    /// Creates a generator with a custom identifier source.
    #[must_use]
    pub fn with_id_generator(id_generator: TokenIdGenerator) -> Self {
        Self { id_generator }
    }

    fn mint(&self, lifetime: i64) -> Token {
        Token::new((self.id_generator)(), expiration_from_now(lifetime))
    }
}

impl Default for DefaultTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultTokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultTokenGenerator").finish_non_exhaustive()
    }
}

impl TokenGenerator for DefaultTokenGenerator {
    fn generate_access_token(&self, config: &ServerConfig, grant: &dyn Grant) -> Token {
        let lifetime = match grant.access_token_expiration() {
            0 => config.default_access_token_expires,
            seconds => seconds,
        };
        self.mint(lifetime)
    }

    fn generate_refresh_token(&self, config: &ServerConfig, _grant: &dyn Grant) -> Token {
        self.mint(config.default_refresh_token_expires)
    }
}

/// Converts a lifetime in seconds into an absolute epoch-seconds expiration.
fn expiration_from_now(lifetime: i64) -> i64 {
    if lifetime == NO_EXPIRATION {
        return NO_EXPIRATION;
    }
    OffsetDateTime::now_utc()
        .unix_timestamp()
        .saturating_add(lifetime)
}
