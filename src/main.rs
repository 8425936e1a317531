use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use catalog_admin::{
    cache::RedisCache,
    config::Config,
    db::{self, PgCatalogStore},
    routes::create_router,
    storage::build_object_store,
    utils::init_logger,
    AppState, CatalogService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database
    let pool = db::create_pool(&config.database).await?;

    info!("Bootstrapping database schema...");
    db::init_schema(&pool).await?;

    // Cache connects in the background and reports unavailable until ready
    let cache = RedisCache::new(&config.redis)?;
    if cache.connect_in_background().is_none() {
        warn!("Redis disabled, cache invalidation will be skipped");
    }

    let objects = build_object_store(&config.storage)?;
    info!("Object store: {}", objects.provider());

    let catalog = CatalogService::new(
        Arc::new(PgCatalogStore::new(pool)),
        objects,
        Arc::new(cache),
    )
    .with_admin_role(&config.auth.admin_role);

    let state = AppState::new(Arc::new(catalog), config.auth.clone());
    let app = create_router(state, &config.server);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
