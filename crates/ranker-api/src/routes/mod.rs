//! API 라우트.
//!
//! - `/getStockRanks`: 종목 랭킹 (API 키 필요)
//! - `/health`: 생존 확인
//! - `/health/ready`: 준비 상태

pub mod health;
pub mod ranking;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub use health::{health_router, HealthResponse, ReadinessResponse};
pub use ranking::{ranking_router, StockRanksRequest, StockRanksResponse};

/// 상태가 적용된 전체 라우트. 미들웨어 레이어는 바이너리에서 추가합니다.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(ranking_router())
        .nest("/health", health_router())
        .with_state(state)
}
