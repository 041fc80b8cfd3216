//! # brainctl: Control Service for Knowledge Stores
//!
//! `brainctl` is a self-hostable control service for per-workspace knowledge
//! stores ("brains"). It provides a RESTful API for managing brains and for
//! uploading files into them, enforcing per-brain storage quotas before any
//! upload is handed to the downstream ingestion pipeline.
//!
//! ## Overview
//!
//! Teams that feed documents into a retrieval pipeline need somewhere to
//! enforce who may upload, how much a workspace may hold, and which files are
//! worth processing at all. `brainctl` sits in front of the ingestion
//! pipeline and owns exactly that slice: request validation, quota
//! arithmetic, duplicate detection, and metadata persistence. The expensive
//! work - parsing, chunking, embedding, summarization - is performed by
//! downstream consumers of the file records this service writes.
//!
//! ### Request Flow
//!
//! A client calls `POST /upload` with a bearer API key, a `brain_id` query
//! parameter, and a multipart file. The authentication extractor resolves
//! the key to an account, the handler loads the brain and its consumed
//! bytes, and the upload is admitted only if it fits the remaining space.
//! Callers that supply their own model API key in the `Openai-Api-Key`
//! header are granted the larger configured ceiling instead of the brain's
//! own. Admitted files flow into [`processors::filter_file`], which
//! classifies the file, skips duplicates by content digest, and records the
//! file for ingestion. The outcome - success, warning, or quota/type
//! rejection - is always reported as a typed message with HTTP 200; only
//! infrastructure failures surface as HTTP errors.
//!
//! Note that the quota read is not serialized against concurrent uploads to
//! the same brain: two requests racing past the gate can together overshoot
//! the ceiling. The ceiling is advisory capacity control, not a hard
//! storage bound.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence needs.
//!
//! The **API layer** ([`api`]) exposes the upload endpoint plus brain and
//! file-record management. The **authentication layer** ([`auth`]) resolves
//! bearer API keys to accounts. The **database layer** ([`db`]) uses the
//! repository pattern; each entity (users, API keys, brains, brain files)
//! has a repository handling queries and mutations. The **ingestion
//! dispatch** ([`processors`]) decides what happens to an admitted upload.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use brainctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = brainctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging and optional OpenTelemetry)
//!     brainctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
pub mod errors;
mod openapi;
pub mod processors;
pub mod quota;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    config::CorsOrigin,
    db::{
        handlers::{ApiKeys, Repository, Users},
        models::{api_keys::ApiKeyCreateDBRequest, users::UserCreateDBRequest},
    },
    openapi::ApiDoc,
};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Router, http,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ApiKeyId, BrainId, FileId, UserId, abbrev_uuid};

/// Application state shared across all request handlers.
///
/// Contains the shared resources needed by the API handlers: the PostgreSQL
/// connection pool and the loaded configuration.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the brainctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Ensure the initial admin user exists.
///
/// This function is idempotent - on first run it creates the admin account
/// and a bootstrap API key (logged once so the operator can store it); on
/// subsequent runs it returns the existing account untouched.
#[instrument(skip_all)]
pub async fn ensure_admin_user(email: &str, db: &PgPool) -> Result<UserId, anyhow::Error> {
    let mut tx = db.begin().await?;

    let existing = {
        let mut users = Users::new(&mut tx);
        users.get_user_by_email(email).await?
    };

    if let Some(user) = existing {
        tx.commit().await?;
        return Ok(user.id);
    }

    let username = match email.split('@').next() {
        Some("") | None => "admin",
        Some(name) => name,
    };

    let user = {
        let mut users = Users::new(&mut tx);
        users
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                email: email.to_string(),
            })
            .await?
    };

    let api_key = {
        let mut api_keys = ApiKeys::new(&mut tx);
        api_keys.create(&ApiKeyCreateDBRequest::new(user.id, "Bootstrap key")).await?
    };

    tx.commit().await?;

    info!(
        user_id = %user.id,
        api_key = %api_key.secret,
        "Created initial admin user; store this bootstrap API key securely, it will not be shown again"
    );

    Ok(user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.security.cors.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - The quota-gated upload endpoint (with its own body limit)
/// - Brain and file-record management routes
/// - OpenAPI documentation at `/docs`
/// - Optional Prometheus metrics
/// - CORS configuration
/// - Tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Upload route gets its own body limit (other routes use the default)
    let upload_limit = state.config.uploads.max_file_size;
    let upload_router = Router::new().route(
        "/upload",
        post(api::handlers::upload::upload_file).layer(DefaultBodyLimit::max(upload_limit as usize)),
    );

    let api_routes = Router::new()
        .merge(upload_router)
        // Brain management
        .route("/brains", get(api::handlers::brains::list_brains))
        .route("/brains", post(api::handlers::brains::create_brain))
        .route("/brains/{brain_id}", get(api::handlers::brains::get_brain))
        // File records
        .route("/brains/{brain_id}/files", get(api::handlers::files::list_brain_files))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to PostgreSQL, runs
///    migrations, and ensures the initial admin user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests
///    drain, connections close, and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool_settings = &config.database.pool;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(pool_settings.max_connections)
            .min_connections(pool_settings.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(pool_settings.acquire_timeout_secs))
            .connect(&config.database.url)
            .await?;

        Self::new_with_pool(config, Some(pool)).await
    }

    /// Create an application over an existing pool (used by tests, where the
    /// pool comes from the test harness)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let pool = match pool {
            Some(pool) => pool,
            None => PgPool::connect(&config.database.url).await?,
        };

        migrator().run(&pool).await?;

        ensure_admin_user(&config.admin_email, &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to ensure initial admin user: {}", e))?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "brainctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        // Shutdown telemetry
        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ensure_admin_user;
    use crate::db::handlers::{ApiKeys, Users, api_keys::ApiKeyFilter, repository::Repository as _};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_ensure_admin_user_is_idempotent(pool: PgPool) {
        let first = ensure_admin_user("admin@test.com", &pool).await.unwrap();
        let second = ensure_admin_user("admin@test.com", &pool).await.unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_user_by_email("admin@test.com").await.unwrap().unwrap();
        assert_eq!(user.id, first);
        assert_eq!(user.username, "admin");

        // Exactly one bootstrap key, even after the second call
        let keys = ApiKeys::new(&mut conn)
            .list(&ApiKeyFilter::new(0, 10).user_id(first))
            .await
            .unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "Bootstrap key");
    }

    #[sqlx::test]
    async fn test_healthz(pool: PgPool) {
        let app = crate::test_utils::create_test_app(pool).await;
        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }
}
