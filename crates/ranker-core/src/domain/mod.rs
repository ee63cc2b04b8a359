//! 도메인 모델.
//!
//! - [`market_cap`]: 시가총액 구간과 요청 필터 파싱
//! - [`snapshot`]: 저장되는 재무 스냅샷 행과 계산된 지표
//! - [`fundamentals`]: 재무제표 원본과 지표 산출 정책
//! - [`ranking`]: 마법공식 랭킹 엔진

pub mod fundamentals;
pub mod market_cap;
pub mod ranking;
pub mod snapshot;

pub use fundamentals::{
    derive_metrics, is_bank_like, FinancialStatement, RawFundamentals, ReportedValue, SkipReason,
    StatementSeries,
};
pub use market_cap::{parse_market_cap_filter, MarketCapCategory};
pub use ranking::{competition_rank, rank_snapshots, RankedStock};
pub use snapshot::{FinancialSnapshot, MetricSet};
