//! Product recommendation service.
//!
//! Main entry point that wires the catalog, the counter store and the
//! recommendation engine, then starts the HTTP server.

use clap::Parser;
use recommend_api::{ApiServer, AppState};
use recommend_cache::{CounterStore, LocalCounterStore, RedisCounterStore};
use recommend_catalog::SqliteCatalog;
use recommend_core::config::{AppConfig, CounterBackend};
use recommend_personalization::{RecommendationEngine, VisitRecorder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "recommendation-api")]
#[command(about = "Product catalog with counter-driven recommendations")]
#[command(version)]
struct Cli {
    /// Config file (extension optional; missing file is ignored)
    #[arg(long)]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "RECOMMEND_API__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "RECOMMEND_API__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Counter store backend: redis or local (overrides config)
    #[arg(long)]
    counter_backend: Option<CounterBackend>,

    /// SQLite catalog path (overrides config)
    #[arg(long)]
    catalog_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "recommendation_api=info,recommend_personalization=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Recommendation API starting up");

    let loaded = match &cli.config {
        Some(file) => AppConfig::load_from(file),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(backend) = cli.counter_backend {
        config.counters.backend = backend;
    }
    if let Some(path) = cli.catalog_path {
        config.catalog.database_path = path;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        counter_backend = %config.counters.backend,
        catalog = %config.catalog.database_path,
        "Configuration loaded"
    );

    let catalog = Arc::new(SqliteCatalog::open(&config.catalog.database_path)?);
    if let Some(seed) = &config.catalog.seed_path {
        catalog.seed_from_file(seed)?;
    }

    let counters: Arc<dyn CounterStore> = match config.counters.backend {
        CounterBackend::Redis => Arc::new(
            RedisCounterStore::new(&config.redis, config.counters.session_ttl_secs).await?,
        ),
        CounterBackend::Local => {
            let local = Arc::new(LocalCounterStore::new(config.counters.session_ttl_secs));
            spawn_session_eviction(
                local.clone(),
                Duration::from_secs(config.counters.maintenance_interval_secs),
            );
            local
        }
    };

    let state = AppState {
        catalog: catalog.clone(),
        recorder: Arc::new(VisitRecorder::new(
            counters.clone(),
            config.counters.atomic_increments,
        )),
        engine: Arc::new(RecommendationEngine::new(catalog, counters)),
        recommendations: config.recommendations.clone(),
        node_id: config.node_id.clone(),
        start_time: Instant::now(),
    };

    let api_server = ApiServer::new(config.clone(), state);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Recommendation API is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}

/// Local counters keep session state in process; drop idle sessions
/// periodically. Redis expires them by key TTL instead.
fn spawn_session_eviction(store: Arc<LocalCounterStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let evicted = store.evict_expired();
            if evicted > 0 {
                debug!(evicted = evicted, "Expired sessions evicted");
            }
        }
    });
}
