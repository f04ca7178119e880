//! dirasa server entry point.
//!
//! Boots the HTTP service: layered config, SQLite archive, remote provider
//! clients, and the study pipeline behind two API routes.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dirasa_client::{ClassifierClient, ClassifierConfig, GeneratorClient, GeneratorConfig};
use dirasa_core::{AppConfig, ArchiveDb, StudyPipeline};

mod error;
mod routes;

use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let archive = ArchiveDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open archive at {}", config.db_path.display()))?;
    tracing::info!(path = %config.db_path.display(), "archive ready");

    let classifier = ClassifierClient::new(ClassifierConfig {
        api_key: config.require_classifier_api_key()?.to_string(),
        model: config.classifier_model.clone(),
        timeout: config.classify_timeout(),
        ..Default::default()
    })
    .context("failed to build classifier client")?;

    let generator = GeneratorClient::new(GeneratorConfig {
        api_key: config.require_generator_api_key()?.to_string(),
        model: config.generator_model.clone(),
        timeout: config.generate_timeout(),
        ..Default::default()
    })
    .context("failed to build generator client")?;

    let state = AppState { pipeline: Arc::new(StudyPipeline::new(classifier, generator, archive)) };
    let app = create_router(state);

    tracing::info!(addr = %config.bind_addr, "starting dirasa server");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/studies", post(routes::create_study).get(routes::list_studies))
        .route("/api/health", get(routes::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
        .with_state(state)
}
