mod config;
mod engine;
mod errors;
mod routes;
mod salary;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::engine::keywords::KeywordTables;
use crate::engine::CvAnalyzer;
use crate::routes::build_router;
use crate::salary::predictor::SalaryPredictor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV evaluation API v{}", env!("CARGO_PKG_VERSION"));

    // Keyword tables: bundled unless KEYWORDS_PATH points elsewhere
    let tables = Arc::new(
        KeywordTables::load(config.keywords_path.as_deref())
            .context("Failed to load keyword tables")?,
    );
    info!(
        "Keyword tables loaded ({} skill keywords)",
        tables.skill_keyword_count()
    );

    // Salary model: missing artifacts run degraded, malformed ones abort startup
    let predictor = SalaryPredictor::from_dir(Arc::clone(&tables), &config.model_dir)
        .with_context(|| {
            format!(
                "Failed to load salary model from {}",
                config.model_dir.display()
            )
        })?;
    info!("Salary model loaded: {}", predictor.is_model_loaded());

    let state = AppState {
        analyzer: Arc::new(CvAnalyzer::new(tables)),
        predictor: Arc::new(predictor),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
