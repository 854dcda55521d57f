//! Sessions and scopes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client::{Client, Owner};
use super::token::Token;

/// A named permission unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Storage identifier.
    pub id: String,

    /// Scope name as requested by clients.
    pub name: String,
}

impl Scope {
    /// Creates a scope.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The outcome of a successful grant.
///
/// A grant builds the session with client and owner filled in. The server
/// then adds tokens and resolved scopes before persisting it. A refreshed
/// session keeps its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier, stable across refreshes.
    pub id: String,

    /// Access token, absent only while the session is being built.
    pub access_token: Option<Token>,

    /// Refresh token, if one was issued.
    pub refresh_token: Option<Token>,

    /// Granted scopes keyed by name.
    pub scopes: HashMap<String, Scope>,

    /// Client the session was issued to.
    pub client: Client,

    /// Owner the session acts for.
    pub owner: Owner,

    /// String key/value data attached by grants or post-processing.
    #[serde(default)]
    pub extra_data: HashMap<String, String>,
}

impl Session {
    /// Creates an empty session with a fresh identifier.
    #[must_use]
    pub fn new(client: Client, owner: Owner) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            access_token: None,
            refresh_token: None,
            scopes: HashMap::new(),
            client,
            owner,
            extra_data: HashMap::new(),
        }
    }

    /// Returns `true` if a scope with this name was granted.
    #[must_use]
    pub fn has_scope(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    /// Returns granted scope names in sorted order.
    #[must_use]
    pub fn scope_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scopes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Adds a scope, keyed by its name.
    pub fn insert_scope(&mut self, scope: Scope) {
        self.scopes.insert(scope.name.clone(), scope);
    }
}
