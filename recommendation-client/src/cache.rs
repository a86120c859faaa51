use crate::{Error, Source};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::Future;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strum_macros::Display;
use tokio::sync::watch;

#[cfg(feature = "graphql")]
use async_graphql::SimpleObject;

/// Configuration for the request cache
#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    /// Maximum number of cached entries, unbounded when `None`
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
        }
    }
}

/// Identifies one fetch of one source for one submission.
///
/// The revision is part of the key, so submitting the same text twice
/// produces two keys and two fetches.
#[derive(Hash, Eq, PartialEq, Clone, Debug, Getters, CopyGetters)]
pub struct CacheKey {
    #[getset(get_copy = "pub")]
    source: Source,
    #[getset(get = "pub")]
    query_text: String,
    #[getset(get_copy = "pub")]
    revision: u64,
}

impl CacheKey {
    pub fn new(source: Source, query_text: impl Into<String>, revision: u64) -> Self {
        Self {
            source,
            query_text: query_text.into(),
            revision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Resolved,
    Failed,
}

/// Lifecycle of a cache entry. Once settled it never changes.
#[derive(Debug)]
pub enum EntryState<V> {
    Pending,
    Resolved(Arc<V>),
    Failed(Error),
}

impl<V> Clone for EntryState<V> {
    fn clone(&self) -> Self {
        match self {
            EntryState::Pending => EntryState::Pending,
            EntryState::Resolved(data) => EntryState::Resolved(data.clone()),
            EntryState::Failed(err) => EntryState::Failed(err.clone()),
        }
    }
}

impl<V> EntryState<V> {
    pub fn status(&self) -> EntryStatus {
        match self {
            EntryState::Pending => EntryStatus::Pending,
            EntryState::Resolved(_) => EntryStatus::Resolved,
            EntryState::Failed(_) => EntryStatus::Failed,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, EntryState::Pending)
    }
}

/// Snapshot of a cache entry handed out to readers.
#[derive(Debug)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub state: EntryState<V>,
    pub created_at: DateTime<Utc>,
}

impl<K: Clone, V> Clone for CacheEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            state: self.state.clone(),
            created_at: self.created_at,
        }
    }
}

impl<K, V> CacheEntry<K, V> {
    pub fn status(&self) -> EntryStatus {
        self.state.status()
    }

    pub fn data(&self) -> Option<&Arc<V>> {
        match &self.state {
            EntryState::Resolved(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            EntryState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }
}

/// Outcome of [`RequestCache::ensure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    /// No entry existed, a fetch was started
    Started,
    /// An entry already existed (pending or settled), nothing was started
    Existing,
}

/// Subscription to one entry, taken when it was ensured.
///
/// Keeps observing the entry even if it is evicted or the cache is cleared
/// before the fetch settles.
pub struct EntryWatch<K, V> {
    key: K,
    created_at: DateTime<Utc>,
    ensured: Ensured,
    state: watch::Receiver<EntryState<V>>,
}

impl<K: Debug, V> EntryWatch<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn ensured(&self) -> Ensured {
        self.ensured
    }

    /// Wait until the fetch behind this entry has settled
    pub async fn settled(mut self) -> CacheEntry<K, V> {
        let state = match self.state.wait_for(EntryState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => abandoned(&self.key),
        };

        CacheEntry {
            key: self.key,
            state,
            created_at: self.created_at,
        }
    }
}

fn abandoned<K: Debug, V>(key: &K) -> EntryState<V> {
    EntryState::Failed(Error::Abandoned {
        key: format!("{:?}", key),
    })
}

struct Slot<V> {
    created_at: DateTime<Utc>,
    sequence: u64,
    state: watch::Receiver<EntryState<V>>,
}

/// In-memory cache that runs at most one fetch per key.
///
/// The first `ensure` for a key inserts a pending entry and spawns the
/// fetch. Every later caller for that key observes the same entry, whether
/// it is still pending or already settled. Settled entries are never
/// refreshed; a different key is the only way to fetch again.
pub struct RequestCache<K, V> {
    entries: DashMap<K, Slot<V>>,
    sequence: AtomicU64,
    pub config: CacheConfig,
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            sequence: AtomicU64::new(0),
            config,
        }
    }

    /// Current state of `key`, or `None` if it was never ensured
    pub fn get(&self, key: &K) -> Option<CacheEntry<K, V>> {
        self.entries.get(key).map(|slot| CacheEntry {
            key: key.clone(),
            state: Self::current_state(key, &slot.state),
            created_at: slot.created_at,
        })
    }

    /// Start `fetch` for `key` unless an entry for it already exists.
    ///
    /// Must be called from within a tokio runtime.
    pub fn ensure<F, Fut>(&self, key: K, fetch: F) -> Ensured
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, Error>> + Send + 'static,
    {
        self.ensure_watched(key, fetch).ensured()
    }

    /// Like [`ensure`](Self::ensure), but also subscribes to the entry while
    /// it is still guaranteed to be in the cache.
    pub fn ensure_watched<F, Fut>(&self, key: K, fetch: F) -> EntryWatch<K, V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, Error>> + Send + 'static,
    {
        if let Some(max_entries) = self.config.max_entries {
            if self.entries.len() >= max_entries && !self.entries.contains_key(&key) {
                self.evict_oldest(max_entries);
            }
        }

        let (tx, subscription) = match self.entries.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                log::debug!("Request already known for key: {:?}", key);
                let slot = occupied.get();
                return EntryWatch {
                    key,
                    created_at: slot.created_at,
                    ensured: Ensured::Existing,
                    state: slot.state.clone(),
                };
            }
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(EntryState::Pending);
                let created_at = Utc::now();
                let subscription = EntryWatch {
                    key: key.clone(),
                    created_at,
                    ensured: Ensured::Started,
                    state: rx.clone(),
                };
                vacant.insert(Slot {
                    created_at,
                    sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
                    state: rx,
                });
                (tx, subscription)
            }
        };

        log::debug!("Executing new request for key: {:?}", key);
        let request = fetch();
        tokio::spawn(async move {
            let state = match request.await {
                Ok(data) => EntryState::Resolved(Arc::new(data)),
                Err(err) => {
                    log::warn!("Request failed for key {:?}: {}", key, err);
                    EntryState::Failed(err)
                }
            };
            tx.send_replace(state);
            log::debug!("Request settled for key: {:?}", key);
        });

        subscription
    }

    /// Wait until the entry for `key` has settled.
    ///
    /// Returns `None` if the key was never ensured.
    pub async fn wait(&self, key: &K) -> Option<CacheEntry<K, V>> {
        let watch = self.watch(key)?;
        Some(watch.settled().await)
    }

    /// Subscribe to the existing entry for `key`
    pub fn watch(&self, key: &K) -> Option<EntryWatch<K, V>> {
        self.entries.get(key).map(|slot| EntryWatch {
            key: key.clone(),
            created_at: slot.created_at,
            ensured: Ensured::Existing,
            state: slot.state.clone(),
        })
    }

    /// Ensure `key` and wait for its settled entry
    pub async fn resolve<F, Fut>(&self, key: K, fetch: F) -> CacheEntry<K, V>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, Error>> + Send + 'static,
    {
        self.ensure_watched(key, fetch).settled().await
    }

    fn current_state(key: &K, rx: &watch::Receiver<EntryState<V>>) -> EntryState<V> {
        let state = rx.borrow().clone();
        // The sender only disappears without settling if the fetch task died
        if !state.is_settled() && rx.has_changed().is_err() {
            return abandoned(key);
        }
        state
    }

    /// Remove the least recently created settled entries until there is room
    /// for one more. Pending entries are never evicted.
    fn evict_oldest(&self, max_entries: usize) {
        let mut settled: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.value().state.borrow().is_settled())
            .map(|entry| {
                let slot = entry.value();
                (entry.key().clone(), slot.created_at, slot.sequence)
            })
            .collect();

        settled.sort_by_key(|(_, created_at, sequence)| (*created_at, *sequence));

        let to_remove = (self.entries.len() + 1).saturating_sub(max_entries);
        for (key, _, _) in settled.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }

        log::debug!("Evicted up to {} oldest cache entries", to_remove);
    }

    /// Clear all cache entries. In-flight fetches keep running but their
    /// results are dropped.
    pub fn clear(&self) {
        self.entries.clear();
        log::info!("Request cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            total_entries: self.entries.len(),
            pending_entries: 0,
            resolved_entries: 0,
            failed_entries: 0,
            max_entries: self.config.max_entries,
            oldest_entry: None,
        };

        for entry in self.entries.iter() {
            let slot = entry.value();
            match Self::current_state(entry.key(), &slot.state).status() {
                EntryStatus::Pending => stats.pending_entries += 1,
                EntryStatus::Resolved => stats.resolved_entries += 1,
                EntryStatus::Failed => stats.failed_entries += 1,
            }
            if stats.oldest_entry.map_or(true, |oldest| slot.created_at < oldest) {
                stats.oldest_entry = Some(slot.created_at);
            }
        }

        stats
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(SimpleObject))]
pub struct CacheStats {
    pub total_entries: usize,
    pub pending_entries: usize,
    pub resolved_entries: usize,
    pub failed_entries: usize,
    pub max_entries: Option<usize>,
    pub oldest_entry: Option<DateTime<Utc>>,
}

/// Thread-safe wrapper for the cache
pub type SharedRequestCache<K, V> = Arc<RequestCache<K, V>>;
