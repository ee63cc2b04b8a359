//! API 키 검사.
//!
//! [`ApiKey`]를 받는 핸들러는 설정된 헤더에 설정된 키가 있을 때만
//! 실행됩니다.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

/// 요청에 유효한 API 키가 있었음을 나타냅니다.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

/// 키 누락 또는 불일치 시 거부 응답.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized access")]
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for ApiKey {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.auth.api_key.expose_secret();
        let provided = parts
            .headers
            .get(state.auth.header_name.as_str())
            .and_then(|h| h.to_str().ok());

        match provided {
            Some(key) if !expected.is_empty() && constant_time_eq(key, expected) => Ok(ApiKey),
            _ => {
                warn!(path = %parts.uri.path(), "Rejected request with missing or invalid API key");
                Err(AuthError::Unauthorized)
            }
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
