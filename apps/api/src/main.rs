mod config;
mod db;
mod errors;
mod generation;
mod layout;
mod markup;
mod models;
mod output;
mod pipeline;
mod plaintext;
mod profiles;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::pipeline::{HttpCompileClient, RemoteCompiler, RenderPipeline, RenderSettings};
use crate::profiles::PgProfileStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let settings = RenderSettings {
        geometry: config.page_size.geometry(),
        font: config.font,
        remote_timeout: config.compile_timeout,
    };
    settings.geometry.validate()?;
    info!(
        "Render settings: {:?} page, {:?} font, remote timeout {}s",
        config.page_size,
        config.font,
        config.compile_timeout.as_secs()
    );

    let mut pipeline = RenderPipeline::new(settings);
    match &config.compile_service_url {
        Some(url) => {
            let client = HttpCompileClient::new(url.clone(), config.compile_timeout)
                .context("failed to build compile service client")?;
            info!("Remote compile stage enabled ({})", client.name());
            pipeline = pipeline.with_remote(Arc::new(client));
        }
        None => info!("COMPILE_SERVICE_URL not set, rendering locally only"),
    }

    let mut state = AppState::new(pipeline);
    match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            state = state.with_profiles(Arc::new(PgProfileStore::new(db)));
        }
        None => info!("DATABASE_URL not set, profile routes disabled"),
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
