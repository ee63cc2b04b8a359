//! 테스트용 고정 응답 프로바이더.

use async_trait::async_trait;
use ranker_core::RawFundamentals;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{FundamentalsProvider, UniverseProvider};
use crate::error::{DataError, Result};

enum Fixture {
    Data(RawFundamentals),
    Fail(String),
    Hang(Duration),
}

/// 고정 테이블로 응답하는 재무 데이터 프로바이더.
///
/// 등록되지 않은 심볼은 [`DataError::SymbolNotFound`]로 실패합니다.
#[derive(Default)]
pub struct StaticFundamentalsProvider {
    fixtures: HashMap<String, Fixture>,
    calls: Mutex<Vec<String>>,
}

impl StaticFundamentalsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, raw: RawFundamentals) -> Self {
        self.fixtures.insert(raw.symbol.clone(), Fixture::Data(raw));
        self
    }

    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.fixtures
            .insert(symbol.to_string(), Fixture::Fail(message.to_string()));
        self
    }

    /// 해당 심볼은 `delay`만큼 대기한 뒤 실패합니다.
    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.fixtures.insert(symbol.to_string(), Fixture::Hang(delay));
        self
    }

    /// 지금까지 요청된 심볼 (호출 순서).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FundamentalsProvider for StaticFundamentalsProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<RawFundamentals> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(symbol.to_string());
        }

        match self.fixtures.get(symbol) {
            Some(Fixture::Data(raw)) => Ok(raw.clone()),
            Some(Fixture::Fail(message)) => Err(DataError::FetchError(message.clone())),
            Some(Fixture::Hang(delay)) => {
                tokio::time::sleep(*delay).await;
                Err(DataError::Timeout(symbol.to_string()))
            }
            None => Err(DataError::SymbolNotFound(symbol.to_string())),
        }
    }
}

/// 고정 목록 또는 고정 실패를 반환하는 상장 목록 프로바이더.
pub struct StaticUniverseProvider {
    listing: std::result::Result<Vec<String>, String>,
}

impl StaticUniverseProvider {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            listing: Ok(symbols.into_iter().map(Into::into).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            listing: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl UniverseProvider for StaticUniverseProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_listing(&self) -> Result<Vec<String>> {
        self.listing.clone().map_err(DataError::FetchError)
    }
}
