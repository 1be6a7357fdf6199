//! Counter store implementations

use crate::error::AppError;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

const SCAN_BATCH: usize = 500;

/// Key-value store with atomic integer counters.
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Atomically adds `delta` to `key` (created at zero) and returns the new value.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, AppError>;

    /// Adds to two counters as one unit: either both change or neither does.
    async fn incr_pair(&self, first: (&str, i64), second: (&str, i64)) -> Result<(i64, i64), AppError>;

    /// Reads several counters at once; absent keys are `None`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<i64>>, AppError>;

    /// Lists every key starting with `prefix`, each once.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), AppError>;
}

/// In-memory implementation for development and testing
pub struct InMemoryCounterStore {
    counters: RwLock<HashMap<String, i64>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, AppError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter += delta;
        Ok(*counter)
    }

    async fn incr_pair(&self, first: (&str, i64), second: (&str, i64)) -> Result<(i64, i64), AppError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let a = {
            let counter = counters.entry(first.0.to_string()).or_insert(0);
            *counter += first.1;
            *counter
        };
        let b = {
            let counter = counters.entry(second.0.to_string()).or_insert(0);
            *counter += second.1;
            *counter
        };
        Ok((a, b))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<i64>>, AppError> {
        let counters = self
            .counters
            .read()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(keys.iter().map(|k| counters.get(k).copied()).collect())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let counters = self
            .counters
            .read()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(counters.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Redis implementation for production persistence.
pub struct RedisCounterStore {
    client: redis::Client,
}

impl RedisCounterStore {
    /// Create a new Redis counter store from a connection URL.
    ///
    /// No connection is opened here; an unreachable server surfaces on first use.
    pub fn new(connection_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(connection_url)
            .map_err(|e| AppError::Config(format!("Invalid Redis URL: {}", e)))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, AppError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.incr(key, delta).await?;
        Ok(value)
    }

    async fn incr_pair(&self, first: (&str, i64), second: (&str, i64)) -> Result<(i64, i64), AppError> {
        let mut conn = self.connection().await?;
        // MULTI/EXEC: both increments apply or neither does
        let values: (i64, i64) = redis::pipe()
            .atomic()
            .incr(first.0, first.1)
            .incr(second.0, second.1)
            .query_async(&mut conn)
            .await?;
        Ok(values)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<i64>>, AppError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        // MGET always answers with a list, even for a single key
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key);
        }
        let values: Vec<Option<i64>> = cmd.query_async(&mut conn).await?;
        Ok(values)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", prefix);
        // SCAN may report a key more than once across batches
        let mut keys = BTreeSet::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_increments_from_zero() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.incr_by("a", 5).await.unwrap(), 5);
        assert_eq!(store.incr_by("a", 3).await.unwrap(), 8);
        assert_eq!(
            store.get_many(&["a".to_string(), "b".to_string()]).await.unwrap(),
            vec![Some(8), None]
        );
    }

    #[tokio::test]
    async fn test_in_memory_pair_updates_both_counters() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.incr_pair(("s", 4), ("c", 1)).await.unwrap(), (4, 1));
        assert_eq!(store.incr_pair(("s", 2), ("c", 1)).await.unwrap(), (6, 2));
    }

    #[tokio::test]
    async fn test_in_memory_prefix_listing() {
        let store = InMemoryCounterStore::new();
        store.incr_by("rating:x:sum", 1).await.unwrap();
        store.incr_by("rating:x:count", 1).await.unwrap();
        store.incr_by("other:y", 1).await.unwrap();

        let mut keys = store.keys_with_prefix("rating:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["rating:x:count".to_string(), "rating:x:sum".to_string()]);
    }

    #[tokio::test]
    async fn test_redis_unreachable_is_store_unavailable() {
        let store = RedisCounterStore::new("redis://127.0.0.1:9/").unwrap();
        assert!(matches!(store.ping().await, Err(AppError::StoreUnavailable(_))));
        assert!(matches!(
            store.keys_with_prefix("rating:").await,
            Err(AppError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_redis_bad_url_is_config_error() {
        assert!(matches!(RedisCounterStore::new("not-a-url"), Err(AppError::Config(_))));
    }
}
