//! Response envelope and error mapping
//!
//! Every endpoint answers with `{ success, data, message }`; the HTTP status
//! carries the primary signal.

use crate::error::HelpdeskError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

/// Successful response with a status and a payload
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope {
                success: true,
                data: Some(data),
                message: message.into(),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Boundary translation of [`HelpdeskError`] into the envelope
#[derive(Debug)]
pub struct ApiError(pub HelpdeskError);

impl From<HelpdeskError> for ApiError {
    fn from(err: HelpdeskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Internal server error");
        } else {
            tracing::debug!(status = %status, error = %self.0, "request rejected");
        }

        let body: Envelope<()> = Envelope {
            success: false,
            data: None,
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let response = ApiError(HelpdeskError::forbidden("no")).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError(HelpdeskError::ticket_not_found("x")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError(HelpdeskError::storage("db down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created(1, "made").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
