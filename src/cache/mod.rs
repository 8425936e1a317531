// Cache invalidation
//
// The catalog never populates the cache; readers elsewhere do. Writes here
// only drop the affected key.

use async_trait::async_trait;

pub mod redis_cache;

pub use redis_cache::RedisCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Albums,
    Songs,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Albums => "albums",
            CacheKey::Songs => "songs",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// Whether the client currently holds a live connection. Checked before
    /// every invalidation; nothing is queued while this is false.
    fn is_available(&self) -> bool;

    async fn invalidate(&self, key: CacheKey) -> anyhow::Result<()>;
}
