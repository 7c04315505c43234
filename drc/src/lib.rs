//! # drc: Document Registration Component
//!
//! `drc` registers documents ("enkelvoudige informatieobjecten") together with their binary
//! content, and records which documents belong to which case ("zaak"). It is one component of a
//! larger case-management landscape: cases live in a separate case registry and document types in
//! a type catalogue, and both are referenced here by URL only.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for metadata. Document content is written to a [`FileStorage`] backend (a
//! directory on local disk) under a key derived from the upload date and a fresh UUID, and the
//! key is stored on the row.
//!
//! ### Request Flow
//!
//! Requests to `/api/v1/*` are deserialized into request models that carry their field rules as
//! `validator` attributes. Handlers validate, decode, and then work through repositories
//! ([`db::handlers`]) inside a transaction. Every failure is an [`errors::Error`], which renders
//! as a JSON body with a message and per-field `invalid_params`.
//!
//! Resources refer to each other by hyperlink rather than by id. Hyperlinks are built from the
//! configured `public_url` and resolved back to UUIDs by [`api::links::ResourceLinks`].
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): handlers, request/response models, hyperlinks
//! - **Database layer** ([`db`]): repositories for both resources and the content store
//! - **Configuration** ([`config`]): YAML file plus `DRC_*` environment overrides
//! - **Telemetry** ([`telemetry`]): `tracing` subscriber and optional OTLP export
//!
//! ## Getting Started
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/drc cargo run -- -f config.yaml
//! ```
//!
//! The OpenAPI document is served at `/api-docs/openapi.json` and rendered at `/docs`.

pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use crate::api::links::{API_PREFIX, ResourceLinks};
use crate::config::CorsOrigin;
use crate::db::handlers::FileStorage;
use crate::openapi::ApiDoc;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{Json, Router, http, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{InformatieObjectId, ZaakInformatieObjectId};

/// Application state shared across all request handlers.
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration
/// - `storage`: Backend holding document content
/// - `links`: Builds and resolves resource hyperlinks for `config.public_url`
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .links(ResourceLinks::new(&config.public_url))
///     .config(config)
///     .storage(storage)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub storage: Arc<dyn FileStorage>,
    pub links: ResourceLinks,
}

/// Get the drc database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the origin without a trailing slash
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE, http::header::ACCEPT])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION, http::header::CONTENT_DISPOSITION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - `/healthz`
/// - the registration API under `/api/v1`
/// - the OpenAPI document and its rendered docs
/// - Prometheus metrics when `enable_metrics` is set
/// - request body limit, CORS and tracing layers
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{informatieobjecten, zaakinformatieobjecten};

    let api_routes = Router::new()
        .route(
            "/enkelvoudiginformatieobjecten",
            get(informatieobjecten::list_informatieobjecten).post(informatieobjecten::create_informatieobject),
        )
        .route(
            "/enkelvoudiginformatieobjecten/{uuid}",
            get(informatieobjecten::get_informatieobject).delete(informatieobjecten::delete_informatieobject),
        )
        .route(
            "/enkelvoudiginformatieobjecten/{uuid}/download",
            get(informatieobjecten::download_informatieobject),
        )
        .route(
            "/zaakinformatieobjecten",
            get(zaakinformatieobjecten::list_zaakinformatieobjecten).post(zaakinformatieobjecten::create_zaakinformatieobject),
        )
        .route(
            "/zaakinformatieobjecten/{uuid}",
            get(zaakinformatieobjecten::get_zaakinformatieobject).delete(zaakinformatieobjecten::delete_zaakinformatieobject),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest(API_PREFIX, api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The configured HTTP application and the resources it owns.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, reusing `pool` instead of connecting when one is given
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting document registration component with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => db::connect(&config.database).await?,
        };
        migrator().run(&pool).await?;

        let storage = db::handlers::file_storage::create_file_storage(&config.storage).await?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .links(ResourceLinks::new(&config.public_url))
            .config(config.clone())
            .storage(storage)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Document registration component listening on http://{}, available at {}",
            bind_addr, self.config.public_url
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
