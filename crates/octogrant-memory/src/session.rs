//! In-memory session storage.

use async_trait::async_trait;
use dashmap::DashMap;
use octogrant::storage::{SessionStorage, StorageResult};
use octogrant::{Session, StorageError, Token};

/// Sessions held in memory, indexed by access and refresh token.
///
/// Lookups reject expired tokens. A session whose refresh token has expired
/// (or that never had one) is removed when it is looked up after expiry.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    /// session id -> session
    sessions: DashMap<String, Session>,
    /// access token -> session id
    by_access_token: DashMap<String, String>,
    /// refresh token -> session id
    by_refresh_token: DashMap<String, String>,
}

impl InMemorySessionStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns a stored session by id, expired or not.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    fn lookup(&self, index: &DashMap<String, String>, token: &str) -> StorageResult<Session> {
        let id = index
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("session"))?;
        self.get(&id).ok_or_else(|| StorageError::not_found("session"))
    }

    fn remove(&self, id: &str) -> Option<Session> {
        let (_, session) = self.sessions.remove(id)?;
        self.unindex(&session);
        Some(session)
    }

    fn unindex(&self, session: &Session) {
        if let Some(token) = &session.access_token {
            self.by_access_token
                .remove_if(&token.token, |_, id| id == &session.id);
        }
        if let Some(token) = &session.refresh_token {
            self.by_refresh_token
                .remove_if(&token.token, |_, id| id == &session.id);
        }
    }
}

fn is_expired(token: Option<&Token>) -> bool {
    token.is_none_or(Token::is_expired)
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn find_session_by_access_token(&self, token: &str) -> StorageResult<Session> {
        let session = self.lookup(&self.by_access_token, token)?;

        if is_expired(session.access_token.as_ref()) {
            if is_expired(session.refresh_token.as_ref()) {
                self.remove(&session.id);
                tracing::debug!(session_id = %session.id, "Removed expired session");
            }
            return Err(StorageError::expired("session"));
        }

        Ok(session)
    }

    async fn find_session_by_refresh_token(&self, token: &str) -> StorageResult<Session> {
        let session = self.lookup(&self.by_refresh_token, token)?;

        if is_expired(session.refresh_token.as_ref()) {
            self.remove(&session.id);
            tracing::debug!(session_id = %session.id, "Removed expired session");
            return Err(StorageError::expired("session"));
        }

        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> StorageResult<()> {
        let access_token = session
            .access_token
            .as_ref()
            .ok_or_else(|| StorageError::backend("cannot save a session without an access token"))?;

        // Drop index entries of the version being replaced
        if let Some(previous) = self.sessions.insert(session.id.clone(), session.clone()) {
            self.unindex(&previous);
        }

        self.by_access_token
            .insert(access_token.token.clone(), session.id.clone());
        if let Some(refresh_token) = &session.refresh_token {
            self.by_refresh_token
                .insert(refresh_token.token.clone(), session.id.clone());
        }

        Ok(())
    }

    async fn delete_session(&self, id: &str) -> StorageResult<()> {
        self.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octogrant::{Client, Owner};

    const FAR_FUTURE: i64 = 4_102_444_800; // 2100-01-01

    fn session(access: Token, refresh: Option<Token>) -> Session {
        let client = Client::new("c1", "clientName");
        let owner = Owner::from_client(&client);
        let mut session = Session::new(client, owner);
        session.access_token = Some(access);
        session.refresh_token = refresh;
        session
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let storage = InMemorySessionStorage::new();
        let stored = session(
            Token::new("at", FAR_FUTURE),
            Some(Token::new("rt", FAR_FUTURE)),
        );
        storage.save_session(&stored).await.unwrap();

        assert_eq!(storage.find_session_by_access_token("at").await.unwrap(), stored);
        assert_eq!(storage.find_session_by_refresh_token("rt").await.unwrap(), stored);
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let storage = InMemorySessionStorage::new();
        assert_eq!(
            storage.find_session_by_access_token("nope").await.unwrap_err(),
            StorageError::not_found("session")
        );
        assert!(storage.find_session_by_refresh_token("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_save_without_access_token_fails() {
        let storage = InMemorySessionStorage::new();
        let mut stored = session(Token::new("at", FAR_FUTURE), None);
        stored.access_token = None;

        let err = storage.save_session(&stored).await.unwrap_err();
        assert!(err.is_backend());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_resave_drops_stale_tokens() {
        let storage = InMemorySessionStorage::new();
        let mut stored = session(
            Token::new("at-1", FAR_FUTURE),
            Some(Token::new("rt-1", FAR_FUTURE)),
        );
        storage.save_session(&stored).await.unwrap();

        stored.access_token = Some(Token::new("at-2", FAR_FUTURE));
        stored.refresh_token = Some(Token::new("rt-2", FAR_FUTURE));
        storage.save_session(&stored).await.unwrap();

        assert!(storage.find_session_by_access_token("at-1").await.is_err());
        assert!(storage.find_session_by_refresh_token("rt-1").await.is_err());
        assert_eq!(
            storage.find_session_by_refresh_token("rt-2").await.unwrap().id,
            stored.id
        );
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_resave_with_same_refresh_token_keeps_index() {
        let storage = InMemorySessionStorage::new();
        let mut stored = session(
            Token::new("at-1", FAR_FUTURE),
            Some(Token::new("rt", FAR_FUTURE)),
        );
        storage.save_session(&stored).await.unwrap();

        stored.access_token = Some(Token::new("at-2", FAR_FUTURE));
        storage.save_session(&stored).await.unwrap();

        assert!(storage.find_session_by_refresh_token("rt").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_access_token_with_live_refresh_token() {
        let storage = InMemorySessionStorage::new();
        let stored = session(Token::new("at", 0), Some(Token::new("rt", FAR_FUTURE)));
        storage.save_session(&stored).await.unwrap();

        assert_eq!(
            storage.find_session_by_access_token("at").await.unwrap_err(),
            StorageError::expired("session")
        );
        // Still refreshable
        assert!(storage.find_session_by_refresh_token("rt").await.is_ok());
    }

    #[tokio::test]
    async fn test_fully_expired_session_is_removed() {
        let storage = InMemorySessionStorage::new();
        let stored = session(Token::new("at", 0), None);
        storage.save_session(&stored).await.unwrap();

        assert!(storage.find_session_by_access_token("at").await.is_err());
        assert!(storage.get(&stored.id).is_none());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_removes_session() {
        let storage = InMemorySessionStorage::new();
        let stored = session(Token::new("at", FAR_FUTURE), Some(Token::new("rt", 0)));
        storage.save_session(&stored).await.unwrap();

        assert_eq!(
            storage.find_session_by_refresh_token("rt").await.unwrap_err(),
            StorageError::expired("session")
        );
        assert!(storage.is_empty());
        assert_eq!(
            storage.find_session_by_access_token("at").await.unwrap_err(),
            StorageError::not_found("session")
        );
    }

    #[tokio::test]
    async fn test_never_expiring_tokens() {
        let storage = InMemorySessionStorage::new();
        let stored = session(
            Token::never_expiring("at"),
            Some(Token::never_expiring("rt")),
        );
        storage.save_session(&stored).await.unwrap();

        assert!(storage.find_session_by_access_token("at").await.is_ok());
        assert!(storage.find_session_by_refresh_token("rt").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let storage = InMemorySessionStorage::new();
        let stored = session(Token::new("at", FAR_FUTURE), None);
        storage.save_session(&stored).await.unwrap();

        storage.delete_session(&stored.id).await.unwrap();
        assert!(storage.find_session_by_access_token("at").await.is_err());

        // Deleting again is fine
        storage.delete_session(&stored.id).await.unwrap();
    }
}
