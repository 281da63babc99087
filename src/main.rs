//! Nuclear news service: binary entrypoint.
//! Boots the Axum HTTP server with the aggregation pipeline, metrics and CORS.

use nuclear_news::api::{self, AppState};
use nuclear_news::config::PipelineConfig;
use nuclear_news::ingest::config::load_registry_default;
use nuclear_news::ingest::NewsService;
use nuclear_news::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "nuclear_news=info,ingest=info,warn";

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    // Shuttle may already have installed a subscriber.
    if let Err(e) = res {
        eprintln!("tracing init skipped: {e}");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let registry = load_registry_default()?;
    tracing::info!(feeds = registry.len(), "feed registry loaded");

    let cfg = PipelineConfig::default();
    let metrics = Metrics::init(&cfg)?;
    let news = NewsService::http(registry, cfg)?;

    let router = api::create_router(AppState { news }).merge(metrics.router());

    Ok(router.into())
}
