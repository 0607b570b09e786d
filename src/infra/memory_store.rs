//! 进程内临时存储
//!
//! 未配置 Redis 时的替代实现（单机部署/开发/测试）。
//! 底层用 moka 缓存兜底淘汰，过期判定以条目自带的 deadline 为准。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::Result;
use crate::repository::EphemeralStore;

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// 进程内 TTL 键值存储
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(100_000)
            // 兜底淘汰；实际过期以 Entry.expires_at 为准
            .time_to_live(Duration::from_secs(3600))
            .build();

        Self { cache }
    }

    fn live_value(entry: Entry) -> Option<String> {
        if Instant::now() < entry.expires_at {
            Some(entry.value)
        } else {
            None
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.and_then(Self::live_value))
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        // moka 没有原子的 get+remove；单进程部署下 remove 返回被移除的值，
        // 语义上等价于 Redis GETDEL
        let removed = self.cache.remove(key).await;
        Ok(removed.and_then(Self::live_value))
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_take() {
        let store = MemoryStore::new();
        store
            .set_ex("k", "v", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.take("k").await.unwrap(), Some("v".to_string()));
        // take 之后值已消费
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let store = MemoryStore::new();
        store
            .set_ex("k", "v", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_is_last_write_wins() {
        let store = MemoryStore::new();
        store
            .set_ex("k", "first", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_ex("k", "second", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.take("k").await.unwrap(), Some("second".to_string()));
    }
}
