//! Client and owner identities.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// Grant types implemented by this crate.
///
/// The server registry is keyed by plain strings, so custom grants may use
/// any other name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Client Credentials flow.
    ClientCredentials,
    /// Resource Owner Password Credentials flow.
    Password,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client_credentials" => Ok(Self::ClientCredentials),
            "password" => Ok(Self::Password),
            "refresh_token" => Ok(Self::RefreshToken),
            other => Err(format!("unknown grant type: {other}")),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered client application.
///
/// Secrets are never part of this type. Storage verifies them during lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Registered redirect URI. Empty when the client has none.
    #[serde(default)]
    pub redirect_uri: String,
}

impl Client {
    /// Creates a client with no redirect URI.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            redirect_uri: String::new(),
        }
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }
}

// =============================================================================
// Owner
// =============================================================================

/// The resource owner a session acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Unique owner identifier.
    pub id: String,

    /// Display name.
    pub name: String,
}

impl Owner {
    /// Creates an owner.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Builds the owner of a client acting on its own behalf.
    #[must_use]
    pub fn from_client(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
        }
    }
}
