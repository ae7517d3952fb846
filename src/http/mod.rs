//! The thin HTTP adapter: routing, CORS, auth, and error mapping. No axum
//! types leak into `select`, `publish`, `store`, `manifest`, or `index` — this
//! module only calls them.

mod auth;
mod cors;
mod error;
mod handlers;

use crate::blob::BlobStore;
use crate::config::Config;
use crate::store::ReleaseStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReleaseStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub config: Config,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/zls/select-version", get(handlers::select_version))
        .route("/v1/zls/index.json", get(handlers::index_redirect))
        .route("/v1/zls/publish", post(handlers::publish))
        .route("/v1/zls/releases/:version", get(handlers::get_release))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(cors::cors_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
