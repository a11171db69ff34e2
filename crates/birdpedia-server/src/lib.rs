//! Birdpedia server library logic.

pub mod api;
pub mod config;

use axum::{routing::get, Extension, Json, Router};
use birdpedia_db::Store;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bird persistence.
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router.
///
/// Paths no route claims fall through to files under `assets_dir` when the
/// directory exists at startup, so `/` serves its `index.html`.
pub fn app(state: AppState, assets_dir: &str) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/bird",
            get(api::get_birds_handler).post(api::create_bird_handler),
        );

    let router = if Path::new(assets_dir).is_dir() {
        tracing::info!(path = %assets_dir, "serving static assets");
        router.fallback_service(ServeDir::new(assets_dir))
    } else {
        tracing::info!(path = %assets_dir, "assets directory not found, skipping static file serving");
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
