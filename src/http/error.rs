//! Maps [`ServiceError`] to the status codes and body shapes in spec.md §7.

use crate::types::{PublishError, ServiceError};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::Publish(err) => (publish_status(err), err.to_string()),
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "store error surfaced to a request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal storage error".to_string())
            }
            ServiceError::Blob(err) => {
                tracing::error!(error = %err, "blob store error surfaced to a request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal storage error".to_string())
            }
            ServiceError::Config(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ServiceError::Manifest(err) => {
                tracing::error!(error = %err, "manifest formatting error surfaced to a request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal manifest error".to_string())
            }
            ServiceError::BadQuery(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServiceError::MalformedAuth => (StatusCode::BAD_REQUEST, self.to_string()),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
        };

        let mut response = (status, axum::Json(ErrorBody { error: message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert("www-authenticate", HeaderValue::from_static("Basic realm=\"admin\""));
        }
        response
    }
}

fn publish_status(error: &PublishError) -> StatusCode {
    match error {
        PublishError::NonZeroMajor => StatusCode::IM_A_TEAPOT,
        PublishError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}
