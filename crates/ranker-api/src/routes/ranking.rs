//! 종목 랭킹 엔드포인트.
//!
//! `POST /getStockRanks`, 본문은 선택 (`{"marketCap": "LARGE"}`).
//! 본문이 없거나 비어 있으면 전체 종목을 대상으로 합니다.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use ranker_core::{RankedStock, RankerError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::ApiKey;
use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::services::rank_stocks;
use crate::state::AppState;

/// 요청 본문.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRanksRequest {
    /// "LARGE", "MID" 또는 "SMALL"
    #[serde(default)]
    pub market_cap: Option<String>,
}

impl StockRanksRequest {
    /// 원본 본문을 파싱합니다. 비어 있으면 필터 없음.
    pub fn from_body(body: &[u8]) -> Result<Self, RankerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|_| RankerError::Validation(GENERIC_ERROR_MESSAGE.to_string()))
    }
}

/// 성공 응답 본문.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRanksResponse {
    pub status: &'static str,
    pub total_stocks: usize,
    pub stocks: Vec<RankedStock>,
}

/// `POST /getStockRanks`
pub async fn get_stock_ranks(
    _key: ApiKey,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StockRanksResponse>, ApiError> {
    let request = StockRanksRequest::from_body(&body)?;
    let stocks = rank_stocks(state.snapshots.as_ref(), request.market_cap.as_deref()).await?;

    Ok(Json(StockRanksResponse {
        status: "success",
        total_stocks: stocks.len(),
        stocks,
    }))
}

pub fn ranking_router() -> Router<Arc<AppState>> {
    Router::new().route("/getStockRanks", post(get_stock_ranks))
}
