//! Shared test doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::{PersistenceConfig, ServerConfig};
use crate::error::StorageError;
use crate::server::Server;
use crate::storage::{
    ClientStorage, OwnerStorage, ScopeStorage, SessionStorage, StorageResult,
};
use crate::types::{Client, Owner, Scope, Session, Token};

/// Storage double implementing every storage trait.
///
/// Seeded with client `c1`/`secret` ("clientName"), owner `alice`/`wonderland`
/// (`o1`, "Alice"), and scopes `read` and `write`.
pub struct MockStorage {
    clients: RwLock<HashMap<String, (Client, String)>>,
    owners: RwLock<HashMap<String, (Owner, String)>>,
    scopes: RwLock<HashMap<String, Scope>>,
    sessions: RwLock<HashMap<String, Session>>,
    /// id -> id reported by `refresh_client`/`refresh_owner`
    reassigned_ids: RwLock<HashMap<String, String>>,
    failing_saves: AtomicU32,
    save_calls: AtomicU32,
}

impl MockStorage {
    pub fn new() -> Self {
        let storage = Self {
            clients: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
            scopes: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            reassigned_ids: RwLock::new(HashMap::new()),
            failing_saves: AtomicU32::new(0),
            save_calls: AtomicU32::new(0),
        };
        storage.add_client(Client::new("c1", "clientName"), "secret");
        storage.add_owner("alice", "wonderland", Owner::new("o1", "Alice"));
        for name in ["read", "write"] {
            storage
                .scopes
                .write()
                .unwrap()
                .insert(name.to_string(), Scope::new(format!("scope-{name}"), name));
        }
        storage
    }

    pub fn add_client(&self, client: Client, secret: &str) {
        self.clients
            .write()
            .unwrap()
            .insert(client.id.clone(), (client, secret.to_string()));
    }

    pub fn add_owner(&self, username: &str, password: &str, owner: Owner) {
        self.owners
            .write()
            .unwrap()
            .insert(username.to_string(), (owner, password.to_string()));
    }

    pub fn remove_owner(&self, username: &str) {
        self.owners.write().unwrap().remove(username);
    }

    pub fn insert_session(&self, session: Session) {
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    pub fn stored_session(&self, id: &str) -> Option<Session> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    /// Makes `refresh_client`/`refresh_owner` answer for `id` with `new_id`.
    pub fn reassign_id(&self, id: &str, new_id: &str) {
        self.reassigned_ids
            .write()
            .unwrap()
            .insert(id.to_string(), new_id.to_string());
    }

    fn reassigned(&self, id: &mut String) {
        if let Some(new_id) = self.reassigned_ids.read().unwrap().get(id.as_str()) {
            *id = new_id.clone();
        }
    }

    /// Makes the next `count` saves fail with a backend error.
    pub fn fail_next_saves(&self, count: u32) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientStorage for MockStorage {
    async fn find_client_by_id(&self, id: &str) -> StorageResult<Client> {
        self.clients
            .read()
            .unwrap()
            .get(id)
            .map(|(client, _)| client.clone())
            .ok_or_else(|| StorageError::not_found("client"))
    }

    async fn find_client_by_id_and_secret(&self, id: &str, secret: &str) -> StorageResult<Client> {
        let clients = self.clients.read().unwrap();
        match clients.get(id) {
            Some((client, stored)) if stored == secret => Ok(client.clone()),
            Some(_) => Err(StorageError::invalid_credentials("client")),
            None => Err(StorageError::not_found("client")),
        }
    }

    async fn refresh_client(&self, client: &Client) -> StorageResult<Client> {
        let mut refreshed = self.find_client_by_id(&client.id).await?;
        self.reassigned(&mut refreshed.id);
        Ok(refreshed)
    }
}

#[async_trait]
impl OwnerStorage for MockStorage {
    async fn find_owner_by_username(&self, username: &str) -> StorageResult<Owner> {
        self.owners
            .read()
            .unwrap()
            .get(username)
            .map(|(owner, _)| owner.clone())
            .ok_or_else(|| StorageError::not_found("owner"))
    }

    async fn find_owner_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> StorageResult<Owner> {
        let owners = self.owners.read().unwrap();
        match owners.get(username) {
            Some((owner, stored)) if stored == password => Ok(owner.clone()),
            Some(_) => Err(StorageError::invalid_credentials("owner")),
            None => Err(StorageError::not_found("owner")),
        }
    }

    async fn refresh_owner(&self, owner: &Owner) -> StorageResult<Owner> {
        self.owners
            .read()
            .unwrap()
            .values()
            .find(|(o, _)| o.id == owner.id)
            .map(|(o, _)| {
                let mut refreshed = o.clone();
                self.reassigned(&mut refreshed.id);
                refreshed
            })
            .ok_or_else(|| StorageError::not_found("owner"))
    }
}

#[async_trait]
impl SessionStorage for MockStorage {
    async fn find_session_by_access_token(&self, token: &str) -> StorageResult<Session> {
        let sessions = self.sessions.read().unwrap();
        let session = sessions
            .values()
            .find(|s| s.access_token.as_ref().is_some_and(|t| t.token == token))
            .ok_or_else(|| StorageError::not_found("session"))?;
        if session.access_token.as_ref().is_some_and(Token::is_expired) {
            return Err(StorageError::expired("session"));
        }
        Ok(session.clone())
    }

    async fn find_session_by_refresh_token(&self, token: &str) -> StorageResult<Session> {
        let sessions = self.sessions.read().unwrap();
        let session = sessions
            .values()
            .find(|s| s.refresh_token.as_ref().is_some_and(|t| t.token == token))
            .ok_or_else(|| StorageError::not_found("session"))?;
        if session.refresh_token.as_ref().is_some_and(Token::is_expired) {
            return Err(StorageError::expired("session"));
        }
        Ok(session.clone())
    }

    async fn save_session(&self, session: &Session) -> StorageResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(StorageError::backend("injected failure"));
        }
        self.insert_session(session.clone());
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> StorageResult<()> {
        self.sessions.write().unwrap().remove(id);
        Ok(())
    }
}

#[async_trait]
impl ScopeStorage for MockStorage {
    async fn find_scope_by_name(&self, name: &str) -> StorageResult<Scope> {
        self.scopes
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found("scope"))
    }
}

/// Builds a server with every storage backed by `storage`.
pub fn server_with(storage: MockStorage) -> Server {
    let storage = Arc::new(storage);
    Server::new(storage.clone(), storage.clone(), storage.clone(), storage)
        .with_config(ServerConfig::default().with_persistence(PersistenceConfig::for_testing()))
        .expect("test config is valid")
}

/// Stores a session for `c1`/`alice` holding a never-expiring refresh token.
pub fn stored_session(storage: &MockStorage, refresh_token: &str, scopes: &[&str]) -> Session {
    let client = Client::new("c1", "clientName");
    let mut session = Session::new(client, Owner::new("o1", "Alice"));
    session.access_token = Some(Token::never_expiring(format!("at-{refresh_token}")));
    session.refresh_token = Some(Token::never_expiring(refresh_token));
    for name in scopes {
        session.insert_scope(Scope::new(format!("scope-{name}"), *name));
    }
    storage.insert_session(session.clone());
    session
}
