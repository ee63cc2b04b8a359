//! 헬스 체크 엔드포인트.
//!
//! 두 엔드포인트 모두 API 키가 필요 없습니다. 로드 밸런서와
//! 오케스트레이터가 호출합니다.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// 생존 확인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 준비 상태 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// "ready" 또는 "unavailable"
    pub status: String,
    /// "up", "down" 또는 "not_configured"
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// `GET /health/ready`
pub async fn health_ready(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let Some(pool) = &state.db_pool else {
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                database: "not_configured".to_string(),
                message: None,
            }),
        );
    };

    match ranker_data::storage::ping(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                database: "up".to_string(),
                message: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "unavailable".to_string(),
                database: "down".to_string(),
                message: Some(e.to_string()),
            }),
        ),
    }
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
