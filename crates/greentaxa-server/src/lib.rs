// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]
//! Read-only HTTP API over a catalog database.
//!
//! The server is stateless: state is just the database path plus config,
//! and every handler opens its own read-only connection inside
//! `spawn_blocking`, so requests never contend on shared handles.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use greentaxa_api::{ApiError, ApiErrorCode};
use greentaxa_store::{Store, StoreError};
use tracing::debug;

mod handlers;

pub const CRATE_NAME: &str = "greentaxa-server";

pub const DEFAULT_DB_PATH: &str = "greentaxa.sqlite";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Startup contract: the bind address must parse as a socket address
    /// and the body limit must be non-zero.
    pub fn validate(&self) -> Result<(), String> {
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid bind address {}: {e}", self.bind_addr))?;
        if self.body_limit_bytes == 0 {
            return Err("body limit must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Runs one read against a fresh read-only connection, off the runtime.
pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let path = state.config.db_path.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let store = Store::open_read_only(&path)?;
        op(&store)
    })
    .await;
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::internal(&err.to_string())),
        Err(err) => Err(ApiError::internal(&err.to_string())),
    }
}

/// `ApiError` carried out of a handler; maps the stable code to a status.
pub(crate) struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0.code {
            ApiErrorCode::InvalidParam => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "request served"
    );
    response
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/v1/version", get(handlers::version_handler))
        .route("/v1/meta", get(handlers::meta_handler))
        .route("/v1/taxonomies", get(handlers::taxonomies_handler))
        .route("/v1/taxonomies/:id", get(handlers::taxonomy_handler))
        .route(
            "/v1/taxonomies/:id/detail",
            get(handlers::taxonomy_detail_handler),
        )
        .route(
            "/v1/taxonomies/:id/objectives",
            get(handlers::taxonomy_objectives_handler),
        )
        .route(
            "/v1/taxonomies/:id/sectors",
            get(handlers::taxonomy_sectors_handler),
        )
        .route(
            "/v1/taxonomies/:id/objectives/:objective_id/sectors",
            get(handlers::objective_sectors_handler),
        )
        .route(
            "/v1/taxonomies/:id/objectives/:objective_id/sectors/:sector_id/activities",
            get(handlers::sector_activities_handler),
        )
        .route("/v1/objectives", get(handlers::objectives_handler))
        .route("/v1/objectives/:id", get(handlers::objective_handler))
        .route("/v1/sectors", get(handlers::sectors_handler))
        .route("/v1/sectors/:id", get(handlers::sector_handler))
        .route("/v1/subsectors", get(handlers::subsectors_handler))
        .route("/v1/subsectors/:id", get(handlers::subsector_handler))
        .route("/v1/activities", get(handlers::activities_handler))
        .route("/v1/activities/:id", get(handlers::activity_handler))
        .route(
            "/v1/activities/:id/criteria",
            get(handlers::activity_criteria_handler),
        )
        .route("/v1/practices", get(handlers::practices_handler))
        .route("/v1/practices/:id", get(handlers::practice_handler))
        .route(
            "/v1/rwanda-adaptation",
            get(handlers::rwanda_adaptation_list_handler),
        )
        .route(
            "/v1/rwanda-adaptation/:id",
            get(handlers::rwanda_adaptation_handler),
        )
        .route(
            "/v1/adaptation-whitelists",
            get(handlers::whitelists_handler),
        )
        .route(
            "/v1/adaptation-whitelists/:id",
            get(handlers::whitelist_handler),
        )
        .route(
            "/v1/adaptation-general-criteria",
            get(handlers::general_criteria_handler),
        )
        .route(
            "/v1/adaptation-general-criteria/:id",
            get(handlers::general_criterion_handler),
        )
        .layer(from_fn(trace_requests))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
