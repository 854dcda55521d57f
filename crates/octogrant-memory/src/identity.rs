//! In-memory client and owner storage.

use async_trait::async_trait;
use dashmap::DashMap;
use octogrant::storage::{ClientStorage, OwnerStorage, StorageResult};
use octogrant::{Client, Owner, StorageError};

use crate::hash_secret;

#[derive(Debug, Clone)]
struct Credentialed<T> {
    entity: T,
    secret_hash: String,
}

impl<T: Clone> Credentialed<T> {
    fn verify(&self, entity_name: &str, secret: &str) -> StorageResult<T> {
        if self.secret_hash == hash_secret(secret) {
            Ok(self.entity.clone())
        } else {
            Err(StorageError::invalid_credentials(entity_name))
        }
    }
}

/// Clients and resource owners held in memory.
///
/// Secrets and passwords are stored as SHA-256 digests.
#[derive(Debug, Default)]
pub struct InMemoryOwnerClientStorage {
    /// client id -> client
    clients: DashMap<String, Credentialed<Client>>,
    /// username -> owner
    owners: DashMap<String, Credentialed<Owner>>,
    /// owner id -> username
    usernames: DashMap<String, String>,
}

impl InMemoryOwnerClientStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client with its secret, replacing any client with the same id.
    pub fn add_client(&self, client: Client, secret: &str) -> &Self {
        self.clients.insert(
            client.id.clone(),
            Credentialed {
                entity: client,
                secret_hash: hash_secret(secret),
            },
        );
        self
    }

    /// Registers an owner under `username`, replacing any owner with that username.
    pub fn add_owner(&self, username: &str, password: &str, owner: Owner) -> &Self {
        if let Some((_, previous)) = self.owners.remove(username) {
            self.usernames.remove(&previous.entity.id);
        }
        self.usernames.insert(owner.id.clone(), username.to_string());
        self.owners.insert(
            username.to_string(),
            Credentialed {
                entity: owner,
                secret_hash: hash_secret(password),
            },
        );
        self
    }

    /// Removes a client.
    pub fn remove_client(&self, id: &str) -> Option<Client> {
        self.clients.remove(id).map(|(_, record)| record.entity)
    }

    /// Removes an owner by username.
    pub fn remove_owner(&self, username: &str) -> Option<Owner> {
        let (_, record) = self.owners.remove(username)?;
        self.usernames.remove(&record.entity.id);
        Some(record.entity)
    }

    /// Number of registered clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of registered owners.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }
}

#[async_trait]
impl ClientStorage for InMemoryOwnerClientStorage {
    async fn find_client_by_id(&self, id: &str) -> StorageResult<Client> {
        self.clients
            .get(id)
            .map(|record| record.entity.clone())
            .ok_or_else(|| StorageError::not_found("client"))
    }

    async fn find_client_by_id_and_secret(&self, id: &str, secret: &str) -> StorageResult<Client> {
        let record = self
            .clients
            .get(id)
            .ok_or_else(|| StorageError::not_found("client"))?;
        record.verify("client", secret)
    }

    async fn refresh_client(&self, client: &Client) -> StorageResult<Client> {
        self.find_client_by_id(&client.id).await
    }
}

#[async_trait]
impl OwnerStorage for InMemoryOwnerClientStorage {
    async fn find_owner_by_username(&self, username: &str) -> StorageResult<Owner> {
        self.owners
            .get(username)
            .map(|record| record.entity.clone())
            .ok_or_else(|| StorageError::not_found("owner"))
    }

    async fn find_owner_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> StorageResult<Owner> {
        let record = self
            .owners
            .get(username)
            .ok_or_else(|| StorageError::not_found("owner"))?;
        record.verify("owner", password)
    }

    async fn refresh_owner(&self, owner: &Owner) -> StorageResult<Owner> {
        let username = self
            .usernames
            .get(&owner.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("owner"))?;
        self.find_owner_by_username(&username).await
    }
}
