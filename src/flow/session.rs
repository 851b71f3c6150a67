use crate::flow::state::AffiliationState;
use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

pub type ConversationStore = Arc<dyn ConversationStoreType>;

/// Holds the affiliation state of every subscriber who is mid-flow.
///
/// The existence of an entry is the sole signal that a subscriber is in a
/// flow; completion and abandonment both remove it.
#[async_trait]
pub trait ConversationStoreType: Send + Sync + Debug {
    /// Returns the in-progress state for this phone, if any.
    async fn get(&self, phone: &str) -> Option<AffiliationState>;

    /// Inserts or replaces the state for this phone.
    async fn put(&self, phone: &str, state: AffiliationState);

    /// Removes the state, ending the flow.
    async fn remove(&self, phone: &str);

    /// Clears all conversations (typically for tests or shutdown).
    fn clear(&self);
}

#[derive(Clone, Debug)]
pub struct InMemoryConversationStore {
    cache: Cache<String, AffiliationState>,
}

impl InMemoryConversationStore {
    /// Creates a store whose entries expire after `ttl_secs` of inactivity.
    /// Expiry is how an abandoned flow ends; there is no cancel command.
    pub fn new(ttl_secs: u64) -> Arc<Self> {
        let cache = Cache::builder()
            .time_to_idle(Duration::from_secs(ttl_secs))
            .eviction_listener(|phone: Arc<String>, _state: AffiliationState, cause| {
                info!("Conversation expired: phone={}, cause={:?}", phone, cause);
            })
            .build();
        Arc::new(Self { cache })
    }
}

#[async_trait]
impl ConversationStoreType for InMemoryConversationStore {
    async fn get(&self, phone: &str) -> Option<AffiliationState> {
        self.cache.get(phone).await
    }

    async fn put(&self, phone: &str, state: AffiliationState) {
        self.cache.insert(phone.to_string(), state).await;
    }

    async fn remove(&self, phone: &str) {
        self.cache.invalidate(phone).await;
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }
}

/// Per-subscriber mutual exclusion for the classify → mutate → persist
/// window. Concurrent messages from different subscribers never contend.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    /// Acquires this subscriber's lock; dropped on every exit path.
    pub async fn acquire(&self, phone: &str) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(phone.to_string()).or_default().value().clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = InMemoryConversationStore::new(60);
        assert_eq!(store.get("0414111").await, None);

        store.put("0414111", AffiliationState::start()).await;
        assert_eq!(store.get("0414111").await, Some(AffiliationState::CollectingName));

        store.remove("0414111").await;
        assert_eq!(store.get("0414111").await, None);
    }

    #[tokio::test]
    async fn test_put_replaces_state() {
        let store = InMemoryConversationStore::new(60);
        store.put("0414111", AffiliationState::start()).await;
        store.put("0414111", AffiliationState::CollectingId { nombre: "Ana".into() }).await;

        assert_eq!(
            store.get("0414111").await,
            Some(AffiliationState::CollectingId { nombre: "Ana".into() })
        );
    }

    #[tokio::test]
    async fn test_states_are_per_phone() {
        let store = InMemoryConversationStore::new(60);
        store.put("0414111", AffiliationState::start()).await;
        assert_eq!(store.get("0424999").await, None);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let store = InMemoryConversationStore::new(60);
        store.put("0414111", AffiliationState::start()).await;
        store.clear();
        // invalidate_all is applied lazily; a fresh get must not see the entry
        store.cache.run_pending_tasks().await;
        assert_eq!(store.get("0414111").await, None);
    }

    #[tokio::test]
    async fn test_locks_serialize_same_phone() {
        let locks = Arc::new(SessionLocks::new());
        let running = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let running = running.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("0414111").await;
                let inside = running.fetch_add(1, Ordering::SeqCst);
                assert_eq!(inside, 0, "two tasks held the same phone's lock");
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_locks_do_not_block_other_phones() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("0414111").await;
        // Must not deadlock: a different key has its own mutex.
        let _b = locks.acquire("0424999").await;
    }
}
