//! 마법공식 주식 랭커 HTTP API.
//!
//! 라우트:
//! - `POST /getStockRanks`: 종목 랭킹 (시가총액 필터 선택)
//! - `GET /health`: 생존 확인
//! - `GET /health/ready`: 준비 상태 (데이터베이스 연결)

pub mod auth;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod tasks;

pub use error::{ApiError, ApiErrorResponse};
pub use routes::api_router;
pub use state::AppState;
