//! In-memory scope storage.

use async_trait::async_trait;
use dashmap::DashMap;
use octogrant::storage::{ScopeStorage, StorageResult};
use octogrant::{Scope, StorageError};

/// Scopes held in memory, keyed by name.
#[derive(Debug, Default)]
pub struct InMemoryScopeStorage {
    scopes: DashMap<String, Scope>,
}

impl InMemoryScopeStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage holding `scopes`.
    #[must_use]
    pub fn with_scopes(scopes: impl IntoIterator<Item = Scope>) -> Self {
        let storage = Self::new();
        for scope in scopes {
            storage.add_scope(scope);
        }
        storage
    }

    /// Adds a scope, replacing any scope with the same name.
    pub fn add_scope(&self, scope: Scope) -> &Self {
        self.scopes.insert(scope.name.clone(), scope);
        self
    }

    /// Removes a scope by name.
    pub fn remove_scope(&self, name: &str) -> Option<Scope> {
        self.scopes.remove(name).map(|(_, scope)| scope)
    }
}

#[async_trait]
impl ScopeStorage for InMemoryScopeStorage {
    async fn find_scope_by_name(&self, name: &str) -> StorageResult<Scope> {
        self.scopes
            .get(name)
            .map(|scope| scope.value().clone())
            .ok_or_else(|| StorageError::not_found("scope"))
    }
}
