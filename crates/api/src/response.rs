//! The JSON envelope every endpoint answers with.
//!
//! Success: `{ "success": true, "message": "...", "data": ... }`.
//! Failure: `{ "success": false, "message": "..." }` with a mapped status.

use std::borrow::Cow;

use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use expensa_core::accounts::AccountError;
use expensa_core::auth::AuthError;
use expensa_core::expense::ExpenseError;
use expensa_shared::{AppError, OcrError};
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// A successful response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: Cow<'static, str>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with a payload.
    pub fn ok(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Overrides the status code.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl ApiResponse<()> {
    /// 200 with a message and no payload.
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        tracing::debug!(status = self.status.as_u16(), message = %self.message, "request succeeded");
        let body = Envelope {
            success: true,
            message: &self.message,
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Error half of the envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = self.0.error_code(), error = %self.0, "request failed");
        } else {
            tracing::info!(code = self.0.error_code(), error = %self.0, "request rejected");
        }

        let message = self.0.public_message();
        let body = Envelope::<()> {
            success: false,
            message: &message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self(err.into())
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        Self(err.into())
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self(AppError::Validation(err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = ApiResponse::ok("Login successful", json!({ "a": 1 })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body(response).await,
            json!({ "success": true, "message": "Login successful", "data": { "a": 1 } })
        );
    }

    #[tokio::test]
    async fn test_message_only_omits_data() {
        let response = ApiResponse::message("Password has been reset successfully").into_response();
        assert_eq!(
            body(response).await,
            json!({ "success": true, "message": "Password has been reset successfully" })
        );
    }

    #[tokio::test]
    async fn test_error_envelope_uses_mapped_status() {
        let response = ApiError(AppError::RateLimited("slow down".into())).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body(response).await, json!({ "success": false, "message": "slow down" }));
    }

    #[tokio::test]
    async fn test_database_details_are_hidden() {
        let response = ApiError(AppError::Database("relation users does not exist".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await["message"], "Internal Server Error");
    }
}
