use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inkhaven_core::{CoreError, ErrorExt, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::Core(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(CoreError::Validation { message }) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Core(error) => {
                error.log_error();
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
