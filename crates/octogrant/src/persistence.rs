//! Background session persistence.
//!
//! Issued sessions are saved off the request path. Each save runs in its own
//! task, retried with exponential backoff. Outcomes are logged and broadcast
//! as [`PersistenceEvent`]s to anyone subscribed.
//!
//! Saves of the same session id are serialized, and only the most recently
//! dispatched version is written: an older version still waiting to retry is
//! dropped once a newer one has been dispatched.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::config::PersistenceConfig;
use crate::error::StorageError;
use crate::storage::SessionStorage;
use crate::types::Session;

// =============================================================================
// Persistence Events
// =============================================================================

/// Outcome of a background save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceEvent {
    /// The session was stored.
    Saved {
        /// Session identifier.
        session_id: String,
        /// Attempts it took, starting at 1.
        attempts: u32,
    },

    /// Every attempt failed. The session was not stored.
    Failed {
        /// Session identifier.
        session_id: String,
        /// Attempts made.
        attempts: u32,
        /// Error from the last attempt.
        error: StorageError,
    },

    /// A newer version of the session was dispatched before this one was
    /// stored, so this version was dropped.
    Superseded {
        /// Session identifier.
        session_id: String,
        /// Attempts made before the version was dropped.
        attempts: u32,
    },
}

impl PersistenceEvent {
    /// Returns the session this event is about.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::Saved { session_id, .. }
            | Self::Failed { session_id, .. }
            | Self::Superseded { session_id, .. } => session_id,
        }
    }

    /// Returns `true` if the session was stored.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Broadcasts persistence outcomes.
pub struct PersistenceNotifier {
    sender: broadcast::Sender<PersistenceEvent>,
}

impl PersistenceNotifier {
    /// Create a new notifier.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of pending events per subscriber, at least 1
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Notify all subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn notify(&self, event: PersistenceEvent) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PersistenceNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

// =============================================================================
// Session Persister
// =============================================================================

/// Saves sessions in background tasks.
#[derive(Clone)]
pub struct SessionPersister {
    storage: Arc<dyn SessionStorage>,
    config: PersistenceConfig,
    notifier: Arc<PersistenceNotifier>,
    ordering: Arc<SaveOrdering>,
}

/// Per-session write ordering.
#[derive(Default)]
struct SaveOrdering {
    next_generation: AtomicU64,
    /// session id -> generation of the latest dispatched version
    latest: DashMap<String, u64>,
    /// session id -> lock held while a version is being written
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl SaveOrdering {
    fn register(&self, session_id: &str) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.insert(session_id.to_string(), generation);
        generation
    }

    fn slot(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.slots.entry(session_id.to_string()).or_default().clone()
    }

    fn is_current(&self, session_id: &str, generation: Option<u64>) -> bool {
        match generation {
            None => true,
            Some(generation) => self
                .latest
                .get(session_id)
                .is_some_and(|latest| *latest == generation),
        }
    }

    fn release(&self, session_id: &str, generation: u64) {
        if self
            .latest
            .remove_if(session_id, |_, latest| *latest == generation)
            .is_some()
        {
            self.slots.remove(session_id);
        }
    }
}

impl SessionPersister {
    /// Creates a persister writing to `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>, config: PersistenceConfig) -> Self {
        let notifier = Arc::new(PersistenceNotifier::new(config.event_capacity));
        Self {
            storage,
            config,
            notifier,
            ordering: Arc::new(SaveOrdering::default()),
        }
    }

    /// Subscribe to persistence outcomes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.notifier.subscribe()
    }

    /// Returns the notifier shared by this persister.
    #[must_use]
    pub fn notifier(&self) -> &Arc<PersistenceNotifier> {
        &self.notifier
    }

    /// Saves `session` in a new task.
    ///
    /// A later dispatch of the same session id supersedes this one if this
    /// one has not been stored yet. Must be called from within a Tokio runtime.
    pub fn dispatch(&self, session: Session) -> JoinHandle<()> {
        let generation = self.ordering.register(&session.id);
        let persister = self.clone();
        tokio::spawn(async move {
            let slot = persister.ordering.slot(&session.id);
            let event = {
                let _guard = slot.lock().await;
                let event = persister.save_generation(&session, Some(generation)).await;
                persister.ordering.release(&session.id, generation);
                event
            };
            persister.notifier.notify(event);
        })
    }

    /// Saves `session`, retrying with exponential backoff.
    ///
    /// Runs in the caller's task and takes no part in dispatch ordering.
    pub async fn save_with_retry(&self, session: &Session) -> PersistenceEvent {
        self.save_generation(session, None).await
    }

    async fn save_generation(
        &self,
        session: &Session,
        generation: Option<u64>,
    ) -> PersistenceEvent {
        let max_attempts = self.config.max_retry_attempts.max(1);
        let mut attempts = 0;
        let mut backoff = self.config.retry_backoff_ms;

        loop {
            if !self.ordering.is_current(&session.id, generation) {
                tracing::debug!(
                    session_id = %session.id,
                    attempts = attempts,
                    "Dropping superseded session version"
                );
                return PersistenceEvent::Superseded {
                    session_id: session.id.clone(),
                    attempts,
                };
            }

            attempts += 1;

            match self.storage.save_session(session).await {
                Ok(()) => {
                    tracing::debug!(
                        session_id = %session.id,
                        attempts = attempts,
                        "Session persisted"
                    );
                    return PersistenceEvent::Saved {
                        session_id: session.id.clone(),
                        attempts,
                    };
                }
                Err(e) => {
                    if attempts >= max_attempts {
                        tracing::error!(
                            session_id = %session.id,
                            attempts = attempts,
                            error = %e,
                            "Session persistence failed after all retries"
                        );
                        return PersistenceEvent::Failed {
                            session_id: session.id.clone(),
                            attempts,
                            error: e,
                        };
                    }

                    tracing::warn!(
                        session_id = %session.id,
                        attempt = attempts,
                        max_attempts = max_attempts,
                        error = %e,
                        backoff_ms = backoff,
                        "Session persistence failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    backoff = backoff.saturating_mul(2); // Exponential backoff
                }
            }
        }
    }
}
