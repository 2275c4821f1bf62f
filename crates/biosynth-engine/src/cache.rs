//! Result caching.
//!
//! Two stores with the same TTL semantics:
//! - [`ResultCache`]: trait + organism → serialized result, over any [`CacheStore`]
//!   (in-process map, or Redis with the `redis-cache` feature). Store errors are
//!   logged and treated as misses.
//! - [`ResultStore`]: request id → result, swept of expired entries on every read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use biosynth_common::{Organism, SynthesisResult};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
    #[error("Cache payload error: {0}")]
    Serde(#[from] serde_json::Error),
}

// ── Clock ────────────────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Mutex::new(Instant::now()) }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.lock().map(|n| *n).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

// ── Key-value stores ─────────────────────────────────────────────────────────

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<bool, CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-process store with lazy expiry.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), clock }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(e) if now <= e.expires_at => return Ok(Some(e.value.clone())),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| now > e.expires_at) {
            entries.remove(key);
            debug!(key, "Evicted expired cache entry");
        }
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<bool, CacheError> {
        let expires_at = self.clock.now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(true)
    }
}

#[cfg(feature = "redis-cache")]
pub use redis_store::RedisStore;

#[cfg(feature = "redis-cache")]
mod redis_store {
    use super::*;
    use redis::AsyncCommands;

    /// Network store; expiry is delegated to Redis `SETEX`.
    pub struct RedisStore {
        client: redis::Client,
        prefix: String,
    }

    impl RedisStore {
        pub fn new(url: &str, prefix: &str) -> Result<Self, CacheError> {
            let client = redis::Client::open(url).map_err(|e| CacheError::Backend(e.to_string()))?;
            Ok(Self { client, prefix: prefix.to_string() })
        }

        fn key(&self, key: &str) -> String {
            format!("{}:{key}", self.prefix)
        }

        async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))
        }
    }

    #[async_trait]
    impl CacheStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let mut conn = self.connection().await?;
            conn.get(self.key(key))
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))
        }

        async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<bool, CacheError> {
            let mut conn = self.connection().await?;
            let _: () = conn
                .set_ex(self.key(key), value, ttl.as_secs().max(1))
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;
            Ok(true)
        }
    }
}

// ── Trait + organism cache ───────────────────────────────────────────────────

pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// `synthesis:{trait}:{organism}`, trait trimmed and lower-cased.
    pub fn key(desired_trait: &str, organism: Organism) -> String {
        format!("synthesis:{}:{}", desired_trait.trim().to_lowercase(), organism.as_str())
    }

    pub async fn get(&self, desired_trait: &str, organism: Organism) -> Option<SynthesisResult> {
        let key = Self::key(desired_trait, organism);
        match self.store.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(result) => {
                    debug!(key = %key, "Cache hit");
                    Some(result)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Best-effort write; failures are logged, never returned.
    pub async fn put(&self, desired_trait: &str, organism: Organism, result: &SynthesisResult) {
        let key = Self::key(desired_trait, organism);
        let outcome = match serde_json::to_string(result) {
            Ok(payload) => self.store.set_with_ttl(&key, payload, self.ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = outcome {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

// ── Request-id store ─────────────────────────────────────────────────────────

pub struct ResultStore {
    entries: RwLock<HashMap<Uuid, (SynthesisResult, Instant)>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl, clock }
    }

    pub async fn insert(&self, result: SynthesisResult) {
        let stored_at = self.clock.now();
        self.entries.write().await.insert(result.request_id, (result, stored_at));
    }

    /// Drops every entry older than the TTL, then looks up `id`.
    pub async fn get(&self, id: &Uuid) -> Option<SynthesisResult> {
        let mut entries = self.entries.write().await;
        let removed = sweep_expired(&mut entries, self.clock.now(), self.ttl);
        if removed > 0 {
            debug!(removed, "Swept expired results");
        }
        entries.get(id).map(|(result, _)| result.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn sweep_expired(entries: &mut HashMap<Uuid, (SynthesisResult, Instant)>, now: Instant, ttl: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, (_, stored_at)| now.saturating_duration_since(*stored_at) <= ttl);
    before - entries.len()
}
