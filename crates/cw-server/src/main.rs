//! CivicWorks server
//!
//! Wires configuration, PostgreSQL, local file storage and sessions into the
//! HTTP API.

use std::sync::Arc;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cw_api::{AppState, Backends};
use cw_auth::SessionStore;
use cw_core::config::AppConfig;
use cw_db::{Database, FeedbackRepository, OfficerRepository, ProjectRepository, SessionRepository};
use cw_storage::LocalStorage;

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting CivicWorks"
    );

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");
    if config.database.run_migrations {
        db.migrate().await.context("failed to apply migrations")?;
    }

    let storage = LocalStorage::new(&config.storage.local_path, &config.storage.public_base_url);
    storage.init().await.context("failed to create upload directory")?;

    let sessions = Arc::new(SessionRepository::new(db.pool().clone()));
    match sessions.cleanup_expired().await {
        Ok(removed) => info!(removed, "Expired sessions removed"),
        Err(err) => warn!(error = %err, "Failed to remove expired sessions"),
    }

    let backends = Backends {
        projects: Arc::new(ProjectRepository::new(db.pool().clone())),
        feedback: Arc::new(FeedbackRepository::new(db.pool().clone())),
        officers: Arc::new(OfficerRepository::new(db.pool().clone())),
        sessions,
        storage: Arc::new(storage),
    };
    let state = AppState::new(backends, &config);

    let health = Arc::new(
        HealthChecker::new(HealthConfig::default())
            .with_database(db.clone())
            .with_upload_dir(&config.storage.local_path),
    );

    let app = build_router(state, health, &config)?;

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` filter, JSON lines when `LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cw_server=debug,cw_api=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let layer = match config.server.cors_allow_origin.as_deref() {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin).context("invalid CORS_ALLOW_ORIGIN")?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };
    Ok(layer)
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, config: &AppConfig) -> anyhow::Result<Router> {
    let health_routes = Router::new()
        .route("/health", get(health::readiness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    let mut app = Router::new()
        .merge(health_routes)
        .merge(cw_api::router(state));

    let base = config.storage.public_base_url.trim_end_matches('/');
    if base.starts_with('/') && base.len() > 1 {
        app = app.nest_service(base, ServeDir::new(&config.storage.local_path));
    }

    let max_body = config.server.max_body_size_bytes;
    Ok(app
        .layer(DefaultBodyLimit::max(max_body))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(config)?)
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_body)),
        ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
