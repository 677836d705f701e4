//! Application wiring: database pool, provider clients, routes, server.

use anyhow::Result;
use axum::http::HeaderValue;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use seen_context::ContextGatherer;
use seen_core::Config;
use seen_db::UploadRepository;
use seen_genai::{GenaiClient, GenaiFileStore};
use seen_verify::VerificationService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// Build state and router from configuration.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.base.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;

    let uploads = UploadRepository::new(pool);

    let gatherer = ContextGatherer::from_urls(
        &config.sun_base_url,
        &config.weather_base_url,
        config.weather_api_key.as_deref(),
        &config.geocode_base_url,
    )?;

    let files = Arc::new(GenaiFileStore::new(
        &config.genai_base_url,
        &config.genai_api_key,
    )?);
    let model = Arc::new(GenaiClient::new(
        &config.genai_base_url,
        &config.genai_api_key,
        &config.genai_model,
    )?);

    let verifier = Arc::new(VerificationService::new(
        Arc::new(uploads.clone()),
        gatherer,
        files,
        model,
        config.verifier.clone(),
    )?);

    let state = Arc::new(AppState { uploads, verifier });

    let router = build_router(state.clone(), &config);
    Ok((state, router))
}

fn build_router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/api/v0/health", get(handlers::health))
        .route("/api/v0/uploads", post(handlers::uploads::create_upload))
        .route("/api/v0/uploads", get(handlers::uploads::list_uploads))
        .route("/api/v0/uploads/{id}", get(handlers::uploads::get_upload))
        .route(
            "/api/v0/uploads/{id}",
            delete(handlers::uploads::delete_upload),
        )
        .route(
            "/api/v0/uploads/{id}/verify",
            post(handlers::verify::verify_upload),
        )
        .route(
            "/api/v0/verifications/batch",
            post(handlers::verify::verify_batch),
        )
        .route(
            "/api/v0/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.base.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.base.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        genai_model = %config.genai_model,
        verify_max_attempts = config.verifier.max_attempts,
        batch_limit = config.verifier.batch_limit,
        weather_enabled = config.weather_api_key.is_some(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
