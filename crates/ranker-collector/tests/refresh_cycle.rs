//! 인메모리 저장소 기반 유니버스 시딩, 재무 데이터 갱신, 랭킹 통합 테스트.

use chrono::NaiveDate;
use ranker_collector::{RefreshJob, UniverseJob};
use ranker_core::domain::fundamentals::fields;
use ranker_core::{
    rank_snapshots, FinancialStatement, MarketCapCategory, RawFundamentals, RefreshConfig,
};
use ranker_data::{InMemoryStore, SnapshotStore, StaticFundamentalsProvider, StaticUniverseProvider};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn statement(items: &[(&str, f64)]) -> FinancialStatement {
    let as_of = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    let mut s = FinancialStatement::new();
    for (field, value) in items {
        s.record(field, as_of, Some(*value));
    }
    s
}

/// 이익수익률이 `ebit / market_cap`(부채 = 현금)이고 투하자본이 1000인
/// 회사.
fn company(symbol: &str, ebit: f64, market_cap: i64) -> RawFundamentals {
    RawFundamentals {
        symbol: symbol.to_string(),
        income_statement: statement(&[(fields::EBIT, ebit)]),
        balance_sheet: statement(&[
            (fields::CASH_AND_CASH_EQUIVALENTS, 100.0),
            (fields::TOTAL_DEBT, 100.0),
            (fields::CURRENT_ASSETS, 400.0),
            (fields::CURRENT_LIABILITIES, 200.0),
            (fields::TOTAL_ASSETS, 1200.0),
        ]),
        market_cap: Some(market_cap),
        sector: None,
    }
}

fn bank(symbol: &str, nii: f64, market_cap: i64) -> RawFundamentals {
    RawFundamentals {
        symbol: symbol.to_string(),
        income_statement: statement(&[(fields::NET_INTEREST_INCOME, nii)]),
        balance_sheet: statement(&[(fields::PAYABLES, 600.0), (fields::TOTAL_LIABILITIES, 400.0)]),
        market_cap: Some(market_cap),
        sector: Some("Financial Services".to_string()),
    }
}

fn refresh_config() -> RefreshConfig {
    RefreshConfig {
        request_delay_ms: 0,
        fetch_timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_cycle_seeds_refreshes_and_ranks() {
    let store = Arc::new(InMemoryStore::new());

    let universe = UniverseJob::new(
        Arc::new(StaticUniverseProvider::new([
            "BIG.NS", "MIDCO.NS", "HDFC.NS", "BROKEN.NS",
        ])),
        store.clone(),
    );
    let seeded = universe.run().await;
    assert_eq!(seeded.new_symbols, 4);
    assert_eq!(store.snapshot_symbols().len(), 4);
    // 시딩 직후의 빈 행은 랭킹에 나오지 않음
    assert!(store.load_rankable().await.unwrap().is_empty());

    let provider = StaticFundamentalsProvider::new()
        .with_data(company("BIG.NS", 30_000_000_000.0, 300_000_000_000))
        .with_data(company("MIDCO.NS", 10_000_000_000.0, 100_000_000_000))
        .with_data(bank("HDFC.NS", 50.0, 1_000))
        .with_failure("BROKEN.NS", "HTTP 500");

    let job = RefreshJob::new(
        Arc::new(provider),
        store.clone(),
        store.clone(),
        refresh_config(),
    );
    let stats = job.run(&CancellationToken::new()).await;

    assert_eq!(stats.total, 4);
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.fetch_errors, 1);
    assert!(store.snapshot("BROKEN.NS").is_none());
    // 유니버스는 추가만 됨
    assert_eq!(store.universe_symbols().len(), 4);

    let rows = store.load_rankable().await.unwrap();
    let ranked = rank_snapshots(&rows, None);
    assert_eq!(ranked.len(), 3);
    for (i, r) in ranked.iter().enumerate() {
        assert_eq!(r.rank, i + 1);
    }

    let hdfc = ranked.iter().find(|r| r.stock == "HDFC.NS").unwrap();
    // 50 / 1000, 50 / (600 + 400)
    assert_eq!(hdfc.market_cap_category, MarketCapCategory::NoCap);
    let hdfc_row = store.snapshot("HDFC.NS").unwrap();
    assert!((hdfc_row.earnings_yield.unwrap() - 0.05).abs() < 1e-12);
    assert!((hdfc_row.return_on_capital.unwrap() - 0.05).abs() < 1e-12);

    let large = rank_snapshots(&rows, Some(MarketCapCategory::Large));
    assert_eq!(large.len(), 1);
    assert_eq!(large[0].stock, "BIG.NS");
}

#[tokio::test]
async fn test_second_universe_run_keeps_refreshed_rows() {
    let store = Arc::new(InMemoryStore::new());
    let listing = || Arc::new(StaticUniverseProvider::new(["BIG.NS"]));

    UniverseJob::new(listing(), store.clone()).run().await;

    let provider = StaticFundamentalsProvider::new().with_data(company(
        "BIG.NS",
        30_000_000_000.0,
        300_000_000_000,
    ));
    RefreshJob::new(Arc::new(provider), store.clone(), store.clone(), refresh_config())
        .run(&CancellationToken::new())
        .await;

    let again = UniverseJob::new(listing(), store.clone()).run().await;
    assert_eq!(again.new_symbols, 0);
    assert_eq!(again.seeded_snapshots, 0);
    assert_eq!(store.snapshot("BIG.NS").unwrap().market_cap, Some(300_000_000_000));
}
