use axum::{http::StatusCode, Json};

use super::dto::{status_for, ErrorResponseDto};
use crate::domain::errors::BackendError;

pub mod bucket_handlers;
pub mod object_handlers;
pub mod signed_url_handlers;

pub use bucket_handlers::*;
pub use object_handlers::*;
pub use signed_url_handlers::*;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub(crate) fn api_error(error: BackendError) -> ApiError {
    (
        status_for(error.kind()),
        Json(ErrorResponseDto::from_backend_error(&error)),
    )
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(message)),
    )
}

/// Liveness check
pub async fn health() -> &'static str {
    "OK"
}
