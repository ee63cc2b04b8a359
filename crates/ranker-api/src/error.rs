//! API 에러 응답.
//!
//! 실패는 `{"status": "error", "message": "..."}` 형식으로 응답합니다.
//! 검증 메시지만 그대로 전달하고, 나머지는 로그에 남긴 뒤 일반 메시지로
//! 응답합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ranker_core::RankerError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// 검증 외 실패에 쓰는 일반 메시지.
pub const GENERIC_ERROR_MESSAGE: &str = "Invalid request";

/// 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 항상 "error"
    pub status: String,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// 핸들러 에러.
#[derive(Debug)]
pub struct ApiError(pub RankerError);

impl From<RankerError> for ApiError {
    fn from(err: RankerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            RankerError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(ApiErrorResponse::new(message)),
            )
                .into_response(),
            RankerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": RankerError::Unauthorized.to_string() })),
            )
                .into_response(),
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiErrorResponse::new(GENERIC_ERROR_MESSAGE)),
                )
                    .into_response()
            }
        }
    }
}
