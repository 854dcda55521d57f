//! Token values.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Expiration marker for tokens that never expire.
pub const NO_EXPIRATION: i64 = -1;

/// An opaque token identifier with an absolute expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token value presented by clients.
    pub token: String,

    /// Expiration as Unix epoch seconds, or [`NO_EXPIRATION`].
    pub expires: i64,
}

impl Token {
    /// Creates a token expiring at `expires` (epoch seconds).
    #[must_use]
    pub fn new(token: impl Into<String>, expires: i64) -> Self {
        Self {
            token: token.into(),
            expires,
        }
    }

    /// Creates a token that never expires.
    #[must_use]
    pub fn never_expiring(token: impl Into<String>) -> Self {
        Self::new(token, NO_EXPIRATION)
    }

    /// Returns `true` if the token never expires.
    #[must_use]
    pub fn never_expires(&self) -> bool {
        self.expires == NO_EXPIRATION
    }

    /// Returns `true` if the token has expired at `now` (epoch seconds).
    ///
    /// A token is still valid during the second it expires in.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        !self.never_expires() && now > self.expires
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Returns the expiration as a timestamp, or `None` if the token never expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        if self.never_expires() {
            return None;
        }
        OffsetDateTime::from_unix_timestamp(self.expires).ok()
    }
}
