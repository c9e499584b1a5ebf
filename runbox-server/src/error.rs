//! Error types for the HTTP layer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use runbox_sandbox::{ExecutionResponse, ProtocolError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request; never reaches screening
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Protocol(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Protocol(e) => ExecutionResponse::protocol_error(e),
        };
        (status, Json(body)).into_response()
    }
}
