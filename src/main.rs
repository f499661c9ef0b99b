use clap::Parser;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genoserve::{
    gateway::SqliteGateway,
    handlers::{create_router, AppState},
    Config, DataContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // All dataset handles live in one context built here; nothing else is
    // process-global.
    let gateway = Arc::new(SqliteGateway::new(&config.database));
    let context = Arc::new(DataContext::new(
        gateway,
        config.chunk_length,
        config.max_sequence_span,
    ));

    let state = AppState { context };
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting genoserve on {}", addr);
    tracing::info!("Database: {:?}", config.database);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
