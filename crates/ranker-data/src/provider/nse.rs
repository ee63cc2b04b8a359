//! NSE 상장 종목 목록.
//!
//! `EQUITY_L.csv`를 내려받아 `SYMBOL` 컬럼을 프로바이더 심볼로 변환합니다
//! (`RELIANCE` → `RELIANCE.NS`).

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use super::UniverseProvider;
use crate::error::{DataError, Result};

const SYMBOL_COLUMN: &str = "SYMBOL";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// NSE 상장 목록 프로바이더.
#[derive(Debug, Clone)]
pub struct NseListingProvider {
    client: reqwest::Client,
    listing_url: String,
    symbol_suffix: String,
}

impl NseListingProvider {
    pub fn new(listing_url: impl Into<String>, symbol_suffix: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DataError::FetchError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            listing_url: listing_url.into(),
            symbol_suffix: symbol_suffix.into(),
        })
    }
}

#[async_trait]
impl UniverseProvider for NseListingProvider {
    fn name(&self) -> &str {
        "nse"
    }

    async fn fetch_listing(&self) -> Result<Vec<String>> {
        let response = self.client.get(&self.listing_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::FetchError(format!(
                "{}: HTTP {}",
                self.listing_url, status
            )));
        }

        let content = response.text().await?;
        let symbols = parse_listing_csv(&content, &self.symbol_suffix)?;

        info!(count = symbols.len(), url = %self.listing_url, "Fetched exchange listing");
        Ok(symbols)
    }
}

/// 상장 목록 CSV에서 접미사가 붙은 심볼을 추출합니다.
///
/// 헤더 이름은 공백 제거 후 비교합니다. 빈 심볼은 버리고, 중복은
/// 처음 위치만 유지합니다.
pub fn parse_listing_csv(content: &str, suffix: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let column = reader
        .headers()?
        .iter()
        .position(|h| h == SYMBOL_COLUMN)
        .ok_or_else(|| DataError::ParseError(format!("listing has no {SYMBOL_COLUMN} column")))?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for record in reader.records() {
        let record = record?;
        let Some(symbol) = record.get(column).map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let symbol = format!("{symbol}{suffix}");
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let csv = "SYMBOL,NAME OF COMPANY, SERIES\n\
                   RELIANCE,Reliance Industries Limited,EQ\n\
                   TCS ,Tata Consultancy Services Limited,EQ\n\
                   ,Blank,EQ\n\
                   RELIANCE,Reliance Industries Limited,EQ\n";

        let symbols = parse_listing_csv(csv, ".NS").unwrap();
        assert_eq!(symbols, vec!["RELIANCE.NS", "TCS.NS"]);
    }

    #[test]
    fn test_parse_listing_trims_header() {
        let csv = " SYMBOL ,NAME OF COMPANY\nINFY,Infosys Limited\n";
        assert_eq!(parse_listing_csv(csv, ".NS").unwrap(), vec!["INFY.NS"]);
    }

    #[test]
    fn test_parse_listing_without_symbol_column() {
        let csv = "TICKER,NAME\nINFY,Infosys\n";
        assert!(matches!(
            parse_listing_csv(csv, ".NS"),
            Err(DataError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_listing() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/content/equities/EQUITY_L.csv")
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body("SYMBOL,NAME OF COMPANY\nHDFCBANK,HDFC Bank Limited\nITC,ITC Limited\n")
            .create_async()
            .await;

        let provider = NseListingProvider::new(
            format!("{}/content/equities/EQUITY_L.csv", server.url()),
            ".NS",
        )
        .unwrap();
        let symbols = provider.fetch_listing().await.unwrap();
        assert_eq!(symbols, vec!["HDFCBANK.NS", "ITC.NS"]);
    }
}
