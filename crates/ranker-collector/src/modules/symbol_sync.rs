//! 심볼 유니버스 갱신.
//!
//! 거래소 상장 목록을 가져와 새 심볼을 유니버스에, 빈 행을 스냅샷
//! 테이블에 시딩합니다. 유니버스에서 심볼을 삭제하지 않습니다.

use ranker_data::{UniverseProvider, UniverseStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::stats::UniverseStats;

/// 유니버스 갱신 작업.
pub struct UniverseJob {
    provider: Arc<dyn UniverseProvider>,
    store: Arc<dyn UniverseStore>,
}

impl UniverseJob {
    pub fn new(provider: Arc<dyn UniverseProvider>, store: Arc<dyn UniverseStore>) -> Self {
        Self { provider, store }
    }

    /// 상장 목록을 가져와 시딩합니다. 실패하지 않습니다. [`UniverseStats::error`] 참고.
    pub async fn run(&self) -> UniverseStats {
        let started = Instant::now();
        let mut stats = UniverseStats::default();

        info!(provider = self.provider.name(), "Universe refresh started");

        let symbols = match self.provider.fetch_listing().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "Failed to fetch exchange listing");
                stats.error = Some(e.to_string());
                stats.elapsed = started.elapsed();
                return stats;
            }
        };
        stats.listed = symbols.len();

        match self.store.seed_symbols(&symbols).await {
            Ok(outcome) => {
                stats.new_symbols = outcome.new_symbols;
                stats.seeded_snapshots = outcome.seeded_snapshots;
            }
            Err(e) => {
                error!(error = %e, listed = symbols.len(), "Failed to seed symbols");
                stats.error = Some(e.to_string());
            }
        }

        stats.elapsed = started.elapsed();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranker_core::{FinancialSnapshot, MetricSet};
    use ranker_data::{InMemoryStore, SnapshotStore, StaticUniverseProvider};

    #[tokio::test]
    async fn test_seeds_new_symbols_without_overwriting() {
        let store = Arc::new(InMemoryStore::new().with_universe(["TCS.NS"]));
        let metrics = MetricSet {
            earnings_yield: 0.1,
            return_on_capital: 0.2,
            market_cap: 10,
        };
        store
            .upsert_batch(
                &[("TCS.NS".to_string(), metrics)],
                chrono::Utc::now().naive_utc(),
            )
            .await
            .unwrap();

        let provider = StaticUniverseProvider::new(["TCS.NS", "INFY.NS"]);
        let stats = UniverseJob::new(Arc::new(provider), store.clone()).run().await;

        assert_eq!(stats.listed, 2);
        assert_eq!(stats.new_symbols, 1);
        assert_eq!(stats.seeded_snapshots, 1);
        assert!(stats.error.is_none());
        assert_eq!(store.universe_symbols(), vec!["INFY.NS", "TCS.NS"]);
        assert_eq!(store.snapshot("INFY.NS"), Some(FinancialSnapshot::blank("INFY.NS")));
        assert_eq!(store.snapshot("TCS.NS").unwrap().earnings_yield, Some(0.1));
    }

    #[tokio::test]
    async fn test_listing_failure_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let provider = StaticUniverseProvider::failing("HTTP 503");

        let stats = UniverseJob::new(Arc::new(provider), store.clone()).run().await;

        assert!(stats.error.is_some());
        assert!(store.universe_symbols().is_empty());
    }

    #[tokio::test]
    async fn test_seed_failure_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_seed(true);
        let provider = StaticUniverseProvider::new(["ITC.NS"]);

        let stats = UniverseJob::new(Arc::new(provider), store).run().await;

        assert_eq!(stats.listed, 1);
        assert!(stats.error.is_some());
    }
}
