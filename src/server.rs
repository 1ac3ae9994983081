//! HTTP server initialization and runtime setup.
//!
//! Picks the store, cache and media backends from [`Config`], wires the
//! services and runs the Axum server until a shutdown signal arrives.

use crate::config::{CacheBackend, Config};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::media::{FsMediaStore, MediaStore};
use crate::infrastructure::persistence::{MemoryStore, Repositories};
use crate::routes::app_router;
use crate::state::{AppSettings, AppState};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or the in-process store
/// - Page cache backend (Redis falls back to memory if unreachable)
/// - Media store under `MEDIA_ROOT`
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Media root cannot be created
/// - Server bind fails
pub async fn run(config: Config) -> Result<()> {
    let repos = open_store(&config).await?;
    let cache = open_cache(&config).await;

    let media: Arc<dyn MediaStore> = Arc::new(
        FsMediaStore::open(&config.media_root)
            .await
            .with_context(|| format!("failed to open media root {}", config.media_root))?,
    );

    let settings = AppSettings {
        session_secret: config.session_secret.clone(),
        session_ttl_hours: config.session_ttl_hours,
        cache_ttl_seconds: config.cache_ttl_seconds,
        cookie_secure: config.cookie_secure,
    };
    let state = AppState::new(repos, cache, media, settings);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid LISTEN address {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn open_store(config: &Config) -> Result<Repositories> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("No database configured; using the in-process store (data is lost on exit)");
        return Ok(Repositories::in_memory(Arc::new(MemoryStore::new())));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(Repositories::postgres(Arc::new(pool)))
}

async fn open_cache(config: &Config) -> Arc<dyn CacheService> {
    let ttl = config.cache_ttl_seconds;
    let memory = || -> Arc<dyn CacheService> {
        Arc::new(MemoryCache::with_max_entries(ttl, config.cache_max_entries))
    };

    match config.cache_backend {
        CacheBackend::None => {
            tracing::info!("Page cache disabled");
            Arc::new(NullCache::new())
        }
        CacheBackend::Memory => {
            tracing::info!("Page cache enabled (memory)");
            memory()
        }
        CacheBackend::Redis => {
            let Some(redis_url) = &config.redis_url else {
                tracing::warn!("CACHE_BACKEND=redis without a Redis URL. Using memory cache.");
                return memory();
            };
            match RedisCache::connect(redis_url, ttl).await {
                Ok(redis) => {
                    tracing::info!("Page cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using memory cache.", e);
                    memory()
                }
            }
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
