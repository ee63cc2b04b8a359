//! 재무 스냅샷 행.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::market_cap::MarketCapCategory;

/// 스냅샷 저장소의 한 행.
///
/// 모든 지표가 없는 행은 추적 중이지만 아직 지표를 계산할 수 없는
/// 심볼을 나타냅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub symbol: String,
    pub earnings_yield: Option<f64>,
    pub return_on_capital: Option<f64>,
    pub market_cap: Option<i64>,
    pub updated_at: Option<NaiveDateTime>,
}

impl FinancialSnapshot {
    /// 유니버스 작업이 시딩하는 빈 행.
    pub fn blank(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            earnings_yield: None,
            return_on_capital: None,
            market_cap: None,
            updated_at: None,
        }
    }

    /// 새로 계산된 지표를 담은 행.
    pub fn from_metrics(
        symbol: impl Into<String>,
        metrics: &MetricSet,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            earnings_yield: Some(metrics.earnings_yield),
            return_on_capital: Some(metrics.return_on_capital),
            market_cap: Some(metrics.market_cap),
            updated_at: Some(updated_at),
        }
    }

    /// 두 비율이 모두 있는지 여부. 빈 행은 랭킹 대상이 아닙니다.
    pub fn is_rankable(&self) -> bool {
        self.earnings_yield.is_some() && self.return_on_capital.is_some()
    }

    pub fn category(&self) -> MarketCapCategory {
        MarketCapCategory::classify(self.market_cap)
    }
}

/// 재무 데이터 조회기가 심볼 하나에 대해 계산한 지표.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub earnings_yield: f64,
    pub return_on_capital: f64,
    pub market_cap: i64,
}
