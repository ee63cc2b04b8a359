//! Yahoo Finance 재무 데이터 클라이언트.
//!
//! 심볼마다 두 엔드포인트를 사용합니다:
//! - fundamentals-timeseries: 연간 재무제표 항목
//! - quoteSummary (`summaryDetail`, `assetProfile`): 시가총액과 섹터

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ranker_core::domain::fundamentals::fields;
use ranker_core::{FinancialStatement, RawFundamentals};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::FundamentalsProvider;
use crate::error::{DataError, Result};

/// 기본 API 호스트.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

const TIMESERIES_PATH: &str = "/ws/fundamentals-timeseries/v1/finance/timeseries";
const QUOTE_SUMMARY_PATH: &str = "/v10/finance/quoteSummary";

/// 시계열 조회 시작 시점 (1985년). 모든 연간 보고서를 포함합니다.
const TIMESERIES_PERIOD_START: i64 = 493_590_046;

const ANNUAL_PREFIX: &str = "annual";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

// ==================== 응답 타입 ====================

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
struct TimeseriesBody {
    #[serde(default)]
    result: Vec<TimeseriesResult>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    meta: TimeseriesMeta,
    /// 타입 이름이 키 (예: `annualEBIT`)
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    kind: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesPoint {
    as_of_date: NaiveDate,
    reported_value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    summary_detail: Option<SummaryDetail>,
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
}

// ==================== 프로바이더 ====================

/// Yahoo Finance 재무 데이터 프로바이더.
#[derive(Debug, Clone)]
pub struct YahooFundamentalsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFundamentalsProvider {
    /// 공개 API 대상 클라이언트 (요청 타임아웃 30초).
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::FetchError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, symbol: &str, url: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self.client.get(url).query(query).send().await?;

        match response.status() {
            s if s.is_success() => Ok(response.text().await?),
            reqwest::StatusCode::NOT_FOUND => Err(DataError::SymbolNotFound(symbol.to_string())),
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                Err(DataError::RateLimited(format!("{symbol}: HTTP 429")))
            }
            s => Err(DataError::FetchError(format!("{symbol}: HTTP {s}"))),
        }
    }

    async fn fetch_statements(
        &self,
        symbol: &str,
    ) -> Result<(FinancialStatement, FinancialStatement)> {
        let types = fields::INCOME_STATEMENT
            .iter()
            .chain(fields::BALANCE_SHEET)
            .map(|f| format!("{ANNUAL_PREFIX}{f}"))
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}{}/{}", self.base_url, TIMESERIES_PATH, symbol);
        let body = self
            .get_json(
                symbol,
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("type", types),
                    ("period1", TIMESERIES_PERIOD_START.to_string()),
                    ("period2", Utc::now().timestamp().to_string()),
                ],
            )
            .await?;

        parse_timeseries(&body)
    }

    async fn fetch_summary(&self, symbol: &str) -> Result<(Option<i64>, Option<String>)> {
        let url = format!("{}{}/{}", self.base_url, QUOTE_SUMMARY_PATH, symbol);
        let body = self
            .get_json(
                symbol,
                &url,
                &[("modules", "summaryDetail,assetProfile".to_string())],
            )
            .await?;

        parse_quote_summary(symbol, &body)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFundamentalsProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<RawFundamentals> {
        let (income_statement, balance_sheet) = self.fetch_statements(symbol).await?;
        let (market_cap, sector) = self.fetch_summary(symbol).await?;

        debug!(
            symbol,
            market_cap = ?market_cap,
            sector = ?sector,
            "Fetched fundamentals"
        );

        Ok(RawFundamentals {
            symbol: symbol.to_string(),
            income_statement,
            balance_sheet,
            market_cap,
            sector,
        })
    }
}

// ==================== 파싱 ====================

/// 시계열 응답을 손익계산서와 재무상태표로 분리합니다.
fn parse_timeseries(body: &str) -> Result<(FinancialStatement, FinancialStatement)> {
    let envelope: TimeseriesEnvelope =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut income = FinancialStatement::new();
    let mut balance = FinancialStatement::new();

    for result in envelope.timeseries.result {
        for type_name in &result.meta.kind {
            let Some(field) = type_name.strip_prefix(ANNUAL_PREFIX) else {
                continue;
            };
            let target = if fields::INCOME_STATEMENT.contains(&field) {
                &mut income
            } else if fields::BALANCE_SHEET.contains(&field) {
                &mut balance
            } else {
                continue;
            };

            let Some(raw_points) = result.series.get(type_name) else {
                continue;
            };
            let points: Vec<Option<TimeseriesPoint>> = serde_json::from_value(raw_points.clone())
                .map_err(|e| DataError::ParseError(format!("{type_name}: {e}")))?;

            for point in points.into_iter().flatten() {
                let value = point.reported_value.and_then(|v| v.raw);
                target.record(field, point.as_of_date, value);
            }
        }
    }

    Ok((income, balance))
}

fn parse_quote_summary(symbol: &str, body: &str) -> Result<(Option<i64>, Option<String>)> {
    let envelope: QuoteSummaryEnvelope =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    let result = envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

    let market_cap = result
        .summary_detail
        .and_then(|d| d.market_cap)
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64);
    let sector = result
        .asset_profile
        .and_then(|p| p.sector)
        .filter(|s| !s.is_empty());

    Ok((market_cap, sector))
}
