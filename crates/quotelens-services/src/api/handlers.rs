//! HTTP request handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, State},
    response::Html,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

use quotelens_types::{Prediction, QuoteLensError, Result};

use super::ApiState;
use super::error::{ApiError, PageError};
use super::render;

/// Browser routes: the upload form and its target.
pub fn page_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(upload_form))
        .route("/data", post(upload_data))
}

/// JSON routes, nested under `/api`.
pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/schema", get(feature_schema))
}

async fn upload_form() -> Html<String> {
    Html(render::upload_form())
}

/// Score `bytes` off the async runtime inside the request span.
async fn score(state: &ApiState, bytes: Bytes) -> Result<Vec<Prediction>> {
    let service = state.service.clone();
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| service.predict_csv(&bytes)))
        .await
        .map_err(|e| QuoteLensError::Io(std::io::Error::other(e)))?
}

async fn upload_data(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> std::result::Result<Html<String>, PageError> {
    let span = info_span!("upload", request_id = %Uuid::new_v4());
    async move {
        let mut upload = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| QuoteLensError::validation("file", e.body_text()))?
        {
            if field.name() == Some("file") {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| QuoteLensError::validation("file", e.body_text()))?;
                upload = Some(bytes);
                break;
            }
        }
        let bytes =
            upload.ok_or_else(|| QuoteLensError::validation("file", "no file was uploaded"))?;
        info!(bytes = bytes.len(), "upload received");

        let predictions = score(&state, bytes).await?;
        Ok::<_, PageError>(Html(render::result_page(&predictions)))
    }
    .instrument(span)
    .await
}

async fn predict(
    State(state): State<ApiState>,
    body: Bytes,
) -> std::result::Result<Json<Vec<Prediction>>, ApiError> {
    let span = info_span!("predict", request_id = %Uuid::new_v4());
    async move {
        info!(bytes = body.len(), "scoring request");
        let predictions = score(&state, body).await?;
        Ok::<_, ApiError>(Json(predictions))
    }
    .instrument(span)
    .await
}

/// Returns basic health status, version, uptime and model width.
async fn health_check(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started.elapsed().as_secs(),
        "features": state.service.bundle().feature_schema().len(),
    }))
}

async fn feature_schema(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "columns": state.service.bundle().feature_schema().fields(),
    }))
}
