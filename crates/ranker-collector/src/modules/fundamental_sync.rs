//! 재무 데이터 갱신.
//!
//! 한 주기는 심볼 목록을 순서대로 돌며 심볼별 지표를 산출한 뒤,
//! 두 배치로 스냅샷 테이블을 맞춥니다:
//! 1. 지표를 계산한 심볼 upsert
//! 2. 건너뛴 심볼 delete
//!
//! 취소 전에 처리하지 못한 심볼은 그대로 둡니다.

use chrono::Utc;
use ranker_core::{derive_metrics, MetricSet, RefreshConfig, SkipReason};
use ranker_data::{DataError, FundamentalsProvider, SnapshotStore, UniverseStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::stats::RefreshStats;

/// 심볼 하나를 조회해 지표를 산출합니다. `timeout`으로 제한됩니다.
pub async fn fetch_metrics(
    provider: &dyn FundamentalsProvider,
    symbol: &str,
    timeout: Duration,
) -> Result<MetricSet, SkipReason> {
    let raw = match tokio::time::timeout(timeout, provider.fetch_fundamentals(symbol)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(DataError::Timeout(_))) | Err(_) => return Err(SkipReason::Timeout),
        Ok(Err(e)) => return Err(SkipReason::FetchError(e.to_string())),
    };

    derive_metrics(&raw)
}

/// 재무 데이터 갱신 작업.
pub struct RefreshJob {
    provider: Arc<dyn FundamentalsProvider>,
    snapshots: Arc<dyn SnapshotStore>,
    universe: Arc<dyn UniverseStore>,
    config: RefreshConfig,
}

impl RefreshJob {
    pub fn new(
        provider: Arc<dyn FundamentalsProvider>,
        snapshots: Arc<dyn SnapshotStore>,
        universe: Arc<dyn UniverseStore>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            provider,
            snapshots,
            universe,
            config,
        }
    }

    /// 설정된 심볼 목록으로 한 주기를 실행합니다. 설정이 없으면 전체
    /// 유니버스를 대상으로 합니다.
    pub async fn run(&self, cancel: &CancellationToken) -> RefreshStats {
        if !self.config.symbols.is_empty() {
            info!(
                count = self.config.symbols.len(),
                "Refreshing configured symbol list"
            );
            return self.run_for_symbols(&self.config.symbols, cancel).await;
        }

        match self.universe.load_symbols().await {
            Ok(symbols) => self.run_for_symbols(&symbols, cancel).await,
            Err(e) => {
                error!(error = %e, "Failed to load symbol universe, skipping cycle");
                RefreshStats::default()
            }
        }
    }

    /// `symbols`로 한 주기를 실행합니다. 실패하지 않으며 결과는 통계에 담깁니다.
    pub async fn run_for_symbols(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> RefreshStats {
        let started = Instant::now();
        let symbols = dedup_in_order(symbols);
        let mut stats = RefreshStats::new(symbols.len());

        info!(
            total = symbols.len(),
            provider = self.provider.name(),
            "Fundamentals refresh started"
        );

        let mut fetched: Vec<(String, MetricSet)> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for (i, symbol) in symbols.iter().enumerate() {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            if i > 0 && !self.config.request_delay().is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.request_delay()) => {}
                    _ = cancel.cancelled() => {
                        stats.cancelled = true;
                        break;
                    }
                }
            }

            stats.processed += 1;
            match fetch_metrics(self.provider.as_ref(), symbol, self.config.fetch_timeout()).await
            {
                Ok(metrics) => {
                    debug!(
                        symbol = %symbol,
                        earnings_yield = metrics.earnings_yield,
                        return_on_capital = metrics.return_on_capital,
                        market_cap = metrics.market_cap,
                        "Computed metrics"
                    );
                    stats.fetched += 1;
                    fetched.push((symbol.clone(), metrics));
                }
                Err(reason) => {
                    warn!(symbol = %symbol, reason = %reason, "Skipping symbol");
                    stats.record_skip(&reason);
                    skipped.push(symbol.clone());
                }
            }
        }

        if stats.cancelled {
            info!(
                processed = stats.processed,
                total = stats.total,
                "Refresh cancelled, reconciling visited symbols only"
            );
        }

        self.reconcile(&fetched, &skipped, &mut stats).await;

        stats.elapsed = started.elapsed();
        stats
    }

    /// 성공 심볼을 upsert한 뒤 건너뛴 심볼을 delete합니다. upsert가 실패해도
    /// delete는 실행합니다.
    async fn reconcile(
        &self,
        fetched: &[(String, MetricSet)],
        skipped: &[String],
        stats: &mut RefreshStats,
    ) {
        let now = Utc::now().naive_utc();

        match self.snapshots.upsert_batch(fetched, now).await {
            Ok(count) => stats.upserted = count,
            Err(e) => {
                error!(error = %e, rows = fetched.len(), "Snapshot upsert batch failed");
                stats.upsert_error = Some(e.to_string());
            }
        }

        match self.snapshots.delete_batch(skipped).await {
            Ok(count) => stats.deleted = count,
            Err(e) => {
                error!(error = %e, rows = skipped.len(), "Snapshot delete batch failed");
                stats.delete_error = Some(e.to_string());
            }
        }
    }
}

fn dedup_in_order(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ranker_core::domain::fundamentals::fields;
    use ranker_core::{FinancialStatement, RawFundamentals};
    use ranker_data::{InMemoryStore, StaticFundamentalsProvider};

    fn statement(items: &[(&str, f64)]) -> FinancialStatement {
        let as_of = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut s = FinancialStatement::new();
        for (field, value) in items {
            s.record(field, as_of, Some(*value));
        }
        s
    }

    fn company(symbol: &str, ebit: f64) -> RawFundamentals {
        RawFundamentals {
            symbol: symbol.to_string(),
            income_statement: statement(&[(fields::EBIT, ebit)]),
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

    fn config() -> RefreshConfig {
        RefreshConfig {
            fetch_timeout_secs: 5,
            request_delay_ms: 0,
            ..Default::default()
        }
    }

    fn job(provider: StaticFundamentalsProvider, store: Arc<InMemoryStore>) -> RefreshJob {
        RefreshJob::new(Arc::new(provider), store.clone(), store, config())
    }

    #[tokio::test]
    async fn test_fetch_metrics_maps_provider_failure() {
        let provider = StaticFundamentalsProvider::new().with_failure("X.NS", "HTTP 500");
        let result = fetch_metrics(&provider, "X.NS", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SkipReason::FetchError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_metrics_timeout() {
        let provider =
            StaticFundamentalsProvider::new().with_delay("SLOW.NS", Duration::from_secs(60));
        let result = fetch_metrics(&provider, "SLOW.NS", Duration::from_secs(1)).await;
        assert_eq!(result, Err(SkipReason::Timeout));
    }

    #[tokio::test]
    async fn test_cycle_upserts_successes_and_deletes_skips() {
        let store = Arc::new(
            InMemoryStore::new()
                .with_snapshots([
                    ranker_core::FinancialSnapshot::blank("X.NS"),
                    ranker_core::FinancialSnapshot::blank("Y.NS"),
                ])
                .with_universe(["X.NS", "Y.NS"]),
        );
        let provider = StaticFundamentalsProvider::new()
            .with_failure("X.NS", "HTTP 500")
            .with_data(company("Y.NS", 100.0));

        let stats = job(provider, store.clone()).run(&CancellationToken::new()).await;

        assert_eq!(stats.total, 2);
        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.upserted, 1);
        assert_eq!(stats.deleted, 1);
        assert!(store.snapshot("X.NS").is_none());
        let y = store.snapshot("Y.NS").unwrap();
        assert!((y.earnings_yield.unwrap() - 0.1).abs() < 1e-12);
        assert!(y.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_upsert_failure_still_runs_delete() {
        let store = Arc::new(InMemoryStore::new().with_snapshots([
            ranker_core::FinancialSnapshot::blank("X.NS"),
            ranker_core::FinancialSnapshot::blank("Y.NS"),
        ]));
        store.fail_upsert(true);
        let provider = StaticFundamentalsProvider::new().with_data(company("Y.NS", 100.0));

        let stats = job(provider, store.clone())
            .run_for_symbols(&["X.NS".to_string(), "Y.NS".to_string()], &CancellationToken::new())
            .await;

        assert!(stats.upsert_error.is_some());
        assert!(stats.delete_error.is_none());
        assert_eq!(stats.deleted, 1);
        assert!(store.snapshot("X.NS").is_none());
        assert_eq!(store.snapshot("Y.NS").unwrap().earnings_yield, None);
    }

    #[tokio::test]
    async fn test_cancelled_cycle_touches_nothing() {
        let store = Arc::new(
            InMemoryStore::new().with_snapshots([ranker_core::FinancialSnapshot::blank("X.NS")]),
        );
        let provider = StaticFundamentalsProvider::new().with_failure("X.NS", "HTTP 500");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let job = job(provider, store.clone());
        let stats = job.run_for_symbols(&["X.NS".to_string()], &cancel).await;

        assert!(stats.cancelled);
        assert_eq!(stats.processed, 0);
        assert!(store.snapshot("X.NS").is_some());
    }

    #[tokio::test]
    async fn test_configured_symbols_override_universe() {
        let store = Arc::new(InMemoryStore::new().with_universe(["A.NS", "B.NS"]));
        let provider = Arc::new(StaticFundamentalsProvider::new().with_data(company("C.NS", 10.0)));
        let config = RefreshConfig {
            symbols: vec!["C.NS".to_string(), "C.NS".to_string()],
            ..config()
        };

        let job = RefreshJob::new(provider.clone(), store.clone(), store.clone(), config);
        let stats = job.run(&CancellationToken::new()).await;

        assert_eq!(stats.total, 1);
        assert_eq!(provider.calls(), vec!["C.NS"]);
        assert!(store.snapshot("C.NS").is_some());
    }

    #[tokio::test]
    async fn test_universe_load_failure_is_noop() {
        let store = Arc::new(InMemoryStore::new().with_universe(["A.NS"]));
        store.fail_load(true);
        let provider = Arc::new(StaticFundamentalsProvider::new());

        let job = RefreshJob::new(provider.clone(), store.clone(), store, config());
        let stats = job.run(&CancellationToken::new()).await;

        assert_eq!(stats.total, 0);
        assert!(provider.calls().is_empty());
    }
}
