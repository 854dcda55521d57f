//! # octogrant
//!
//! Embeddable OAuth 2.0 authorization-grant engine.
//!
//! This crate provides:
//! - Client Credentials, Password and Refresh Token grants
//! - A server that routes token requests to grants and issues sessions
//! - Token minting with per-grant access token lifetimes
//! - Scope resolution and narrowing on refresh
//! - Storage traits for clients, owners, sessions and scopes
//!
//! ## Overview
//!
//! The transport layer turns an incoming token request into a
//! [`GrantRequest`] and calls [`Server::grant_oauth_session`]. The result is
//! either a fully populated [`Session`] or exactly one [`OAuthError`].
//! Issued sessions are persisted in the background.
//!
//! ## Modules
//!
//! - [`config`] - Server configuration
//! - [`error`] - Error taxonomy
//! - [`grant`] - Grant trait and built-in grants
//! - [`persistence`] - Background session persistence
//! - [`request`] - Token request abstraction
//! - [`server`] - Grant server
//! - [`storage`] - Storage traits
//! - [`token`] - Token generation
//! - [`types`] - Domain types

pub mod config;
pub mod error;
pub mod grant;
pub mod persistence;
pub mod request;
pub mod server;
pub mod storage;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{ConfigError, PersistenceConfig, ServerConfig};
pub use error::{BoxError, ErrorKind, OAuthError, StorageError};
pub use grant::{
    ClientCredentialsGrant, Grant, GrantResult, GrantSettings, PasswordGrant, PostProcessingGrant,
    RefreshTokenGrant, authenticate_client,
};
pub use persistence::{PersistenceEvent, PersistenceNotifier, SessionPersister};
pub use request::{BasicGrantRequest, GrantRequest};
pub use server::Server;
pub use storage::{ClientStorage, OwnerStorage, ScopeStorage, SessionStorage, StorageResult};
pub use token::{DefaultTokenGenerator, TokenGenerator, TokenIdGenerator, generate_token_id};
pub use types::{Client, GrantType, NO_EXPIRATION, Owner, Scope, Session, Token};

/// Type alias for grant engine results.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use octogrant::prelude::*;
/// ```
pub mod prelude {
    pub use crate::OAuthResult;
    pub use crate::config::{ConfigError, PersistenceConfig, ServerConfig};
    pub use crate::error::{BoxError, ErrorKind, OAuthError, StorageError};
    pub use crate::grant::{
        ClientCredentialsGrant, Grant, GrantResult, GrantSettings, PasswordGrant,
        PostProcessingGrant, RefreshTokenGrant,
    };
    pub use crate::persistence::PersistenceEvent;
    pub use crate::request::{BasicGrantRequest, GrantRequest, params};
    pub use crate::server::Server;
    pub use crate::storage::{ClientStorage, OwnerStorage, ScopeStorage, SessionStorage};
    pub use crate::token::{DefaultTokenGenerator, TokenGenerator};
    pub use crate::types::{Client, GrantType, NO_EXPIRATION, Owner, Scope, Session, Token};
}
