//! 외부 데이터 프로바이더.

use async_trait::async_trait;
use ranker_core::RawFundamentals;

use crate::error::Result;

pub mod nse;
pub mod yahoo;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixture;

/// 심볼별 재무제표 원본, 시가총액, 섹터 제공자.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// 프로바이더 이름 (로그용).
    fn name(&self) -> &str;

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<RawFundamentals>;
}

/// 거래소 상장 심볼 제공자.
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 상장 심볼 목록. 재무 데이터 프로바이더용 접미사가 붙어 있고,
    /// 상장 목록 순서대로 중복이 제거됩니다.
    async fn fetch_listing(&self) -> Result<Vec<String>>;
}
