//! Mapping of [`QuoteLensError`] onto HTTP responses.
//!
//! Rejected records never take the server down: schema and validation
//! failures become client errors, anything else a 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use quotelens_types::QuoteLensError;

use super::render;

/// JSON error body for the `/api` routes.
#[derive(Debug)]
pub struct ApiError(pub QuoteLensError);

impl From<QuoteLensError> for ApiError {
    fn from(err: QuoteLensError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_request_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// HTML error page for the browser form.
#[derive(Debug)]
pub struct PageError(pub QuoteLensError);

impl From<QuoteLensError> for PageError {
    fn from(err: QuoteLensError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = if self.0.is_request_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Html(render::error_page(&self.0))).into_response()
    }
}
