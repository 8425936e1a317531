use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{CacheKey, CatalogCache};
use crate::config::RedisConfig;

const RECOVERY_PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Whether the connection is usable right now. Flipped down by a failed
/// command and back up once a `PING` gets through again.
#[derive(Debug, Default)]
struct Liveness(AtomicBool);

impl Liveness {
    fn is_up(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn mark_up(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true only for the call that took the connection down.
    fn mark_down(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Redis-backed cache handle. Reports unavailable until the background
/// connect succeeds, and again while the connection manager is reconnecting
/// after a failed command.
#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
    conn: Arc<OnceCell<ConnectionManager>>,
    live: Arc<Liveness>,
}

impl RedisCache {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client: Some(client),
            conn: Arc::new(OnceCell::new()),
            live: Arc::new(Liveness::default()),
        })
    }

    /// A cache that is never available. Used when `REDIS_ENABLED=false`.
    pub fn disabled() -> Self {
        Self {
            client: None,
            conn: Arc::new(OnceCell::new()),
            live: Arc::new(Liveness::default()),
        }
    }

    /// Connect without blocking startup. Returns `None` for a disabled cache.
    pub fn connect_in_background(&self) -> Option<JoinHandle<()>> {
        let client = self.client.clone()?;
        let conn = Arc::clone(&self.conn);
        let live = Arc::clone(&self.live);

        Some(tokio::spawn(async move {
            match ConnectionManager::new(client).await {
                Ok(manager) => {
                    if conn.set(manager).is_ok() {
                        live.mark_up();
                        info!("Connected to redis");
                    }
                }
                Err(e) => error!("Failed to connect to redis: {}", e),
            }
        }))
    }

    /// Poll with `PING` until the manager has reconnected, then report the
    /// cache available again.
    fn watch_recovery(&self, mut conn: ConnectionManager) {
        let live = Arc::clone(&self.live);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(RECOVERY_PROBE_INTERVAL).await;
                let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match pong {
                    Ok(_) => {
                        live.mark_up();
                        info!("Redis connection recovered");
                        return;
                    }
                    Err(e) => debug!("Redis still unavailable: {}", e),
                }
            }
        });
    }
}

#[async_trait]
impl CatalogCache for RedisCache {
    fn is_available(&self) -> bool {
        self.conn.initialized() && self.live.is_up()
    }

    async fn invalidate(&self, key: CacheKey) -> Result<()> {
        let mut conn = self
            .conn
            .get()
            .cloned()
            .ok_or_else(|| anyhow!("redis connection not established"))?;

        let result: redis::RedisResult<()> = conn.del(key.as_str()).await;
        match result {
            Ok(()) => {
                self.live.mark_up();
                Ok(())
            }
            Err(e) => {
                if self.live.mark_down() {
                    warn!("Redis command failed, marking cache unavailable: {}", e);
                    self.watch_recovery(conn);
                }
                Err(e.into())
            }
        }
    }
}
