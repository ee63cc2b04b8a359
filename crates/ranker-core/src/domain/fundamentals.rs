//! 재무제표 원본과 지표 산출.
//!
//! 두 가지 정책이 있습니다. 은행형 발행사(섹터에 "Bank" 또는 "Financial"
//! 포함)는 순이자이익 기준으로 계산합니다. 예금 수취 기관에는 EBIT와
//! 기업가치가 의미 없기 때문입니다. 나머지는 EBIT / 기업가치와
//! EBIT / 투하자본을 사용합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::snapshot::MetricSet;

/// 데이터 프로바이더가 보고하는 재무제표 항목 이름.
pub mod fields {
    pub const EBIT: &str = "EBIT";
    pub const NET_INTEREST_INCOME: &str = "NetInterestIncome";

    pub const CASH_AND_CASH_EQUIVALENTS: &str = "CashAndCashEquivalents";
    pub const CURRENT_ASSETS: &str = "CurrentAssets";
    pub const TOTAL_ASSETS: &str = "TotalAssets";
    pub const CURRENT_LIABILITIES: &str = "CurrentLiabilities";
    pub const TOTAL_DEBT: &str = "TotalDebt";
    pub const PAYABLES: &str = "Payables";
    pub const TOTAL_LIABILITIES: &str = "TotalLiabilitiesNetMinorityInterest";

    /// 지표 산출에 쓰는 손익계산서 항목.
    pub const INCOME_STATEMENT: &[&str] = &[EBIT, NET_INTEREST_INCOME];

    /// 지표 산출에 쓰는 재무상태표 항목.
    pub const BALANCE_SHEET: &[&str] = &[
        CASH_AND_CASH_EQUIVALENTS,
        CURRENT_ASSETS,
        TOTAL_ASSETS,
        CURRENT_LIABILITIES,
        TOTAL_DEBT,
        PAYABLES,
        TOTAL_LIABILITIES,
    ];
}

/// 프로바이더가 섹터를 주지 않을 때 사용하는 값.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// 한 기간에 보고된 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedValue {
    pub as_of: NaiveDate,
    pub value: Option<f64>,
}

/// 한 항목의 기간별 값.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSeries {
    points: Vec<ReportedValue>,
}

impl StatementSeries {
    pub fn new(points: Vec<ReportedValue>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, as_of: NaiveDate, value: Option<f64>) {
        self.points.push(ReportedValue { as_of, value });
    }

    pub fn points(&self) -> &[ReportedValue] {
        &self.points
    }

    /// 실제로 값이 보고된 가장 최근 기간의 값.
    pub fn latest(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.value.filter(|v| !v.is_nan()).map(|v| (p.as_of, v)))
            .max_by_key(|(as_of, _)| *as_of)
            .map(|(_, v)| v)
    }
}

/// 재무제표: 항목 이름 → 기간별 값.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    items: HashMap<String, StatementSeries>,
}

impl FinancialStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, series: StatementSeries) {
        self.items.insert(field.into(), series);
    }

    /// 값을 추가합니다. 처음이면 시리즈를 만듭니다.
    pub fn record(&mut self, field: &str, as_of: NaiveDate, value: Option<f64>) {
        self.items
            .entry(field.to_string())
            .or_default()
            .push(as_of, value);
    }

    pub fn series(&self, field: &str) -> Option<&StatementSeries> {
        self.items.get(field)
    }

    /// `field`의 가장 최근 non-null 값. 항목이 없으면 `None`.
    pub fn latest(&self, field: &str) -> Option<f64> {
        self.series(field).and_then(StatementSeries::latest)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 프로바이더가 심볼 하나에 대해 반환하는 전체 데이터.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    pub symbol: String,
    pub income_statement: FinancialStatement,
    pub balance_sheet: FinancialStatement,
    pub market_cap: Option<i64>,
    pub sector: Option<String>,
}

/// 갱신 주기에서 심볼의 지표를 계산하지 못한 이유.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("fetch failed: {0}")]
    FetchError(String),
    #[error("market cap missing")]
    MarketCapMissing,
    #[error("missing financial data")]
    MissingFinancialData,
    #[error("fetch timed out")]
    Timeout,
}

/// 섹터 문자열이 은행형 정책에 해당하는지 여부.
pub fn is_bank_like(sector: Option<&str>) -> bool {
    let sector = sector.unwrap_or(UNKNOWN_SECTOR);
    sector.contains("Bank") || sector.contains("Financial")
}

/// 재무제표 원본에서 이익수익률과 자본수익률을 산출합니다.
pub fn derive_metrics(raw: &RawFundamentals) -> Result<MetricSet, SkipReason> {
    let market_cap = raw.market_cap.ok_or(SkipReason::MarketCapMissing)?;

    let (earnings_yield, return_on_capital) = if is_bank_like(raw.sector.as_deref()) {
        bank_ratios(raw, market_cap as f64)?
    } else {
        standard_ratios(raw, market_cap as f64)?
    };

    if !earnings_yield.is_finite() || !return_on_capital.is_finite() {
        return Err(SkipReason::MissingFinancialData);
    }

    Ok(MetricSet {
        earnings_yield,
        return_on_capital,
        market_cap,
    })
}

fn bank_ratios(raw: &RawFundamentals, market_cap: f64) -> Result<(f64, f64), SkipReason> {
    let nii = required(&raw.income_statement, fields::NET_INTEREST_INCOME)?;
    let deposits = required(&raw.balance_sheet, fields::PAYABLES)?;
    let total_liabilities = required(&raw.balance_sheet, fields::TOTAL_LIABILITIES)?;

    Ok((nii / market_cap, nii / (deposits + total_liabilities)))
}

fn standard_ratios(raw: &RawFundamentals, market_cap: f64) -> Result<(f64, f64), SkipReason> {
    let ebit = required(&raw.income_statement, fields::EBIT)?;
    let cash = required(&raw.balance_sheet, fields::CASH_AND_CASH_EQUIVALENTS)?;
    let current_assets = required(&raw.balance_sheet, fields::CURRENT_ASSETS)?;
    let total_assets = required(&raw.balance_sheet, fields::TOTAL_ASSETS)?;
    let current_liabilities = required(&raw.balance_sheet, fields::CURRENT_LIABILITIES)?;
    let total_debt = required(&raw.balance_sheet, fields::TOTAL_DEBT)?;

    let enterprise_value = market_cap + total_debt - cash;
    let net_working_capital = current_assets - current_liabilities;
    let net_fixed_assets = total_assets - current_assets;

    Ok((
        ebit / enterprise_value,
        ebit / (net_working_capital + net_fixed_assets),
    ))
}

fn required(statement: &FinancialStatement, field: &str) -> Result<f64, SkipReason> {
    statement
        .latest(field)
        .ok_or(SkipReason::MissingFinancialData)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 3, 31).unwrap()
    }

    fn statement(items: &[(&str, f64)]) -> FinancialStatement {
        let mut s = FinancialStatement::new();
        for (field, value) in items {
            s.record(field, date(2024), Some(*value));
        }
        s
    }

    fn standard_company() -> RawFundamentals {
        RawFundamentals {
            symbol: "TCS.NS".to_string(),
            income_statement: statement(&[(fields::EBIT, 100.0)]),
            balance_sheet: statement(&[
                (fields::CASH_AND_CASH_EQUIVALENTS, 50.0),
                (fields::CURRENT_ASSETS, 300.0),
                (fields::TOTAL_ASSETS, 800.0),
                (fields::CURRENT_LIABILITIES, 100.0),
                (fields::TOTAL_DEBT, 150.0),
            ]),
            market_cap: Some(900),
            sector: Some("Technology".to_string()),
        }
    }

    fn bank() -> RawFundamentals {
        RawFundamentals {
            symbol: "HDFCBANK.NS".to_string(),
            income_statement: statement(&[(fields::NET_INTEREST_INCOME, 60.0)]),
            balance_sheet: statement(&[
                (fields::PAYABLES, 200.0),
                (fields::TOTAL_LIABILITIES, 400.0),
            ]),
            market_cap: Some(1200),
            sector: Some("Financial Services".to_string()),
        }
    }

    #[test]
    fn test_latest_prefers_most_recent_non_null() {
        let series = StatementSeries::new(vec![
            ReportedValue { as_of: date(2022), value: Some(1.0) },
            ReportedValue { as_of: date(2024), value: None },
            ReportedValue { as_of: date(2023), value: Some(3.0) },
        ]);
        assert_eq!(series.latest(), Some(3.0));

        let empty = StatementSeries::new(vec![ReportedValue { as_of: date(2024), value: None }]);
        assert_eq!(empty.latest(), None);
    }

    #[test]
    fn test_standard_formula() {
        let metrics = derive_metrics(&standard_company()).unwrap();
        // ev = 900 + 150 - 50, capital = (300 - 100) + (800 - 300)
        assert!((metrics.earnings_yield - 0.1).abs() < 1e-12);
        assert!((metrics.return_on_capital - 100.0 / 700.0).abs() < 1e-12);
        assert_eq!(metrics.market_cap, 900);
    }

    #[test]
    fn test_bank_formula() {
        let metrics = derive_metrics(&bank()).unwrap();
        assert!((metrics.earnings_yield - 0.05).abs() < 1e-12);
        assert!((metrics.return_on_capital - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_diversified_financial_services_uses_bank_formula() {
        let mut raw = bank();
        raw.sector = Some("Diversified Financial Services".to_string());
        assert!(is_bank_like(raw.sector.as_deref()));
        assert!(derive_metrics(&raw).is_ok());

        // 은행 항목만 존재: 일반 정책이면 EBIT 누락으로 실패
        raw.sector = Some("Industrials".to_string());
        assert_eq!(derive_metrics(&raw), Err(SkipReason::MissingFinancialData));
    }

    #[test]
    fn test_sector_matching_is_case_sensitive() {
        assert!(is_bank_like(Some("Regional Banks")));
        assert!(!is_bank_like(Some("regional banks")));
        assert!(!is_bank_like(None));
    }

    #[test]
    fn test_market_cap_missing() {
        let mut raw = standard_company();
        raw.market_cap = None;
        assert_eq!(derive_metrics(&raw), Err(SkipReason::MarketCapMissing));
    }

    #[test]
    fn test_missing_line_item() {
        let mut raw = standard_company();
        raw.balance_sheet = statement(&[(fields::CASH_AND_CASH_EQUIVALENTS, 50.0)]);
        assert_eq!(derive_metrics(&raw), Err(SkipReason::MissingFinancialData));
    }

    #[test]
    fn test_zero_enterprise_value_is_skipped() {
        let mut raw = standard_company();
        // 900 + 150 - 1050 = 0
        raw.balance_sheet = statement(&[
            (fields::CASH_AND_CASH_EQUIVALENTS, 1050.0),
            (fields::CURRENT_ASSETS, 300.0),
            (fields::TOTAL_ASSETS, 800.0),
            (fields::CURRENT_LIABILITIES, 100.0),
            (fields::TOTAL_DEBT, 150.0),
        ]);
        assert_eq!(derive_metrics(&raw), Err(SkipReason::MissingFinancialData));
    }
}
