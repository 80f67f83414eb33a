//! Persistent response cache shared by the external collaborators
//!
//! Entries live in a `fjall` keyspace, serialized with `postcard` together
//! with their expiry. The global instance is optional: until [`init`] has
//! succeeded every lookup is a miss and every write is dropped.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use tokio::task;

use crate::config::CacheConfig;

static GLOBAL_CACHE: OnceCell<PersistentCache> = OnceCell::const_new();

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) a cache database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

/// Kind of upstream response being cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Geocode,
    Places,
    Weather,
    Traffic,
}

impl CacheKind {
    /// Key namespace so different collaborators never collide
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            CacheKind::Geocode => "geocode",
            CacheKind::Places => "places",
            CacheKind::Weather => "weather",
            CacheKind::Traffic => "traffic",
        }
    }

    #[must_use]
    pub fn key(self, parts: &str) -> String {
        format!("{}:{}", self.prefix(), parts)
    }
}

/// Per-collaborator time-to-live, before jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub geocode: Duration,
    pub places: Duration,
    pub weather: Duration,
    pub traffic: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            geocode: Duration::from_secs(24 * 60 * 60),
            places: Duration::from_secs(60 * 60),
            weather: Duration::from_secs(30 * 60),
            traffic: Duration::from_secs(10 * 60),
        }
    }
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(config: &CacheConfig) -> Self {
        let minutes = |m: u32| Duration::from_secs(u64::from(m) * 60);
        Self {
            geocode: minutes(config.geocode_ttl_minutes),
            places: minutes(config.places_ttl_minutes),
            weather: minutes(config.weather_ttl_minutes),
            traffic: minutes(config.traffic_ttl_minutes),
        }
    }
}

impl TtlPolicy {
    #[must_use]
    pub fn base(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::Geocode => self.geocode,
            CacheKind::Places => self.places,
            CacheKind::Weather => self.weather,
            CacheKind::Traffic => self.traffic,
        }
    }

    /// TTL with ±10% random jitter so entries do not all expire together
    #[must_use]
    pub fn jittered(&self, kind: CacheKind) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        self.base(kind).mul_f64(jitter)
    }
}

/// Initializes the global persistent cache. Only the first call takes effect.
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    let cache = PersistentCache::open(path)?;
    GLOBAL_CACHE
        .set(cache)
        .map_err(|_| anyhow!("Cache already initialized"))?;
    Ok(())
}

// Public, ergonomic API endpoints that use the global cache. Without an
// initialized cache they behave like an always-empty store.
pub async fn put<T: Serialize + Send + Debug + 'static>(key: &str, value: T, ttl: Duration) -> Result<()> {
    match GLOBAL_CACHE.get() {
        Some(cache) => cache.put(key, value, ttl).await,
        None => Ok(()),
    }
}

pub async fn get<T: DeserializeOwned + Send + 'static>(key: &str) -> Result<Option<T>> {
    match GLOBAL_CACHE.get() {
        Some(cache) => cache.get(key).await,
        None => Ok(None),
    }
}

/// Cached lookup that never fails: cache errors are logged and treated as a miss
pub async fn lookup<T: DeserializeOwned + Send + 'static>(key: &str) -> Option<T> {
    match get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

/// Store that never fails: cache errors are logged and dropped
pub async fn store<T: Serialize + Send + Debug + 'static>(key: &str, value: T, ttl: Duration) {
    if let Err(e) = put(key, value, ttl).await {
        tracing::warn!("Cache write failed for {}: {}", key, e);
    }
}
