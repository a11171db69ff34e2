//! HTTP handlers for the bird encyclopedia.

use crate::AppState;
use axum::{
    extract::{Extension, Form, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use birdpedia_db::StoreError;
use birdpedia_types::Bird;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Where the browser is sent after a bird is added: the index page.
pub const CREATED_REDIRECT: &str = "/";

/// Form fields posted by the "add a bird" page.
///
/// Absent fields become empty strings; nothing is validated.
#[derive(Debug, Deserialize)]
pub struct CreateBirdForm {
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub description: String,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /bird`.
pub async fn get_birds_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Bird>>, ApiError> {
    let birds = tokio::task::spawn_blocking(move || state.store.get_birds())
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))?
        .inspect_err(|e| tracing::error!(error = %e, "failed to list birds"))?;

    Ok(Json(birds))
}

/// Handler for `POST /bird`.
///
/// Stores the submitted bird and redirects back to the index page.
pub async fn create_bird_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<CreateBirdForm>,
) -> Result<Response, ApiError> {
    let bird = Bird::new(form.species, form.description);

    tokio::task::spawn_blocking(move || {
        state
            .store
            .create_bird(&bird)
            .inspect_err(|e| {
                tracing::error!(error = %e, species = %bird.species, "failed to create bird")
            })
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {}", e)))??;

    Ok((StatusCode::FOUND, [(header::LOCATION, CREATED_REDIRECT)]).into_response())
}
