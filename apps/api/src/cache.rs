//! JSON cache over Redis with an in-process fallback.
//!
//! Every value is stored with the configured TTL. When Redis is unreachable the
//! same key/TTL semantics are served from a local map so callers never have to
//! care which backend answered.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "linkivo";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct Cache {
    redis: Option<redis::Client>,
    fallback: Arc<Mutex<HashMap<String, MemoryEntry>>>,
    ttl: Duration,
}

impl Cache {
    pub fn new(redis: redis::Client, ttl: Duration) -> Self {
        Self {
            redis: Some(redis),
            fallback: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// A cache with no Redis behind it.
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            redis: None,
            fallback: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.redis_get(key).await {
            Ok(Some(raw)) => Some(raw),
            Ok(None) if self.redis.is_some() => None,
            Ok(None) => self.memory_get(key),
            Err(e) => {
                warn!("Cache read for {key} fell back to memory: {e}");
                self.memory_get(key)
            }
        }?;

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Cache hit: {key}");
                Some(value)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping cache write for {key}: {e}");
                return;
            }
        };

        if let Err(e) = self.redis_set(key, &raw).await {
            warn!("Cache write for {key} fell back to memory: {e}");
            self.memory_set(key, raw);
        } else if self.redis.is_none() {
            self.memory_set(key, raw);
        }
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    /// Errors from `compute` are returned as-is and nothing is cached.
    pub async fn get_or_try_insert<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get_json(key).await {
            return Ok(hit);
        }
        let value = compute().await?;
        self.set_json(key, &value).await;
        Ok(value)
    }

    async fn redis_get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let Some(client) = &self.redis else {
            return Ok(None);
        };
        let mut conn = client.get_multiplexed_async_connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn redis_set(&self, key: &str, raw: &str) -> Result<(), CacheError> {
        let Some(client) = &self.redis else {
            return Ok(());
        };
        let mut conn = client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, raw, self.ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    fn memory_get(&self, key: &str) -> Option<String> {
        let mut map = self.fallback.lock().ok()?;
        match map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Inserts into the fallback map. Expired entries are swept on every write,
    /// so keys that are never read again do not pile up during a Redis outage.
    fn memory_set(&self, key: &str, value: String) {
        if let Ok(mut map) = self.fallback.lock() {
            let now = Instant::now();
            map.retain(|_, entry| entry.expires_at > now);
            map.insert(
                key.to_string(),
                MemoryEntry {
                    value,
                    expires_at: now + self.ttl,
                },
            );
        }
    }
}

/// Builds a namespaced key from arbitrary-length parts by hashing them.
pub fn cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    format!("{KEY_PREFIX}:{namespace}:{}", hasher.finalize().to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let cache = Cache::in_memory(Duration::from_secs(60));
        cache.set_json("k", &vec!["rust", "sql"]).await;
        let hit: Option<Vec<String>> = cache.get_json("k").await;
        assert_eq!(hit, Some(vec!["rust".to_string(), "sql".to_string()]));
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = Cache::in_memory(Duration::from_millis(0));
        cache.set_json("k", &1u32).await;
        let hit: Option<u32> = cache.get_json("k").await;
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries() {
        let cache = Cache::in_memory(Duration::from_millis(0));
        cache.set_json("never-read", &1u32).await;
        cache.set_json("next", &2u32).await;

        let map = cache.fallback.lock().unwrap();
        assert!(!map.contains_key("never-read"));
        assert_eq!(map.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_computes_once() {
        let cache = Cache::in_memory(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v: Result<u32, String> = cache
                .get_or_try_insert("answer", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(v, Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_does_not_cache_errors() {
        let cache = Cache::in_memory(Duration::from_secs(60));
        let first: Result<u32, String> = cache
            .get_or_try_insert("k", || async { Err("boom".to_string()) })
            .await;
        assert!(first.is_err());
        let second: Result<u32, String> = cache.get_or_try_insert("k", || async { Ok(7) }).await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        // Port 1 is never a Redis server; every call errors and lands in memory.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let cache = Cache::new(client, Duration::from_secs(60));
        cache.set_json("k", &"v").await;
        let hit: Option<String> = cache.get_json("k").await;
        assert_eq!(hit.as_deref(), Some("v"));
    }

    #[test]
    fn test_cache_key_is_stable_and_separates_parts() {
        let a = cache_key("analysis", &["ab", "c"]);
        let b = cache_key("analysis", &["a", "bc"]);
        assert_ne!(a, b);
        assert_eq!(a, cache_key("analysis", &["ab", "c"]));
        assert!(a.starts_with("linkivo:analysis:"));
    }
}
