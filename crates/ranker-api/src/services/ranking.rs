//! 랭킹 서비스.

use ranker_core::{parse_market_cap_filter, rank_snapshots, RankedStock, RankerError, RankerResult};
use ranker_data::SnapshotStore;
use tracing::debug;

/// 저장된 스냅샷의 순위를 매깁니다. 시가총액 구간 하나로 제한할 수 있습니다.
///
/// 필터는 저장소를 읽기 전에 검증합니다. 잘못된 필터로는 쿼리를 실행하지
/// 않습니다.
pub async fn rank_stocks(
    store: &dyn SnapshotStore,
    filter: Option<&str>,
) -> RankerResult<Vec<RankedStock>> {
    let category = parse_market_cap_filter(filter)?;
    let rows = store.load_rankable().await.map_err(RankerError::from)?;
    let ranked = rank_snapshots(&rows, category);

    debug!(
        rows = rows.len(),
        ranked = ranked.len(),
        filter = ?category,
        "Ranked stocks"
    );

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranker_core::FinancialSnapshot;
    use ranker_data::InMemoryStore;

    #[tokio::test]
    async fn test_invalid_filter_skips_store() {
        let store = InMemoryStore::new();
        store.fail_load(true);

        let err = rank_stocks(&store, Some("HUGE")).await.unwrap_err();
        assert!(matches!(err, RankerError::Validation(msg) if msg == "Market Cap not in List"));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let store = InMemoryStore::new();
        store.fail_load(true);

        let err = rank_stocks(&store, None).await.unwrap_err();
        assert!(matches!(err, RankerError::Storage(_)));
    }

    #[tokio::test]
    async fn test_blank_rows_are_not_ranked() {
        let store = InMemoryStore::new().with_snapshots([
            FinancialSnapshot::blank("AAA.NS"),
            FinancialSnapshot::blank("BBB.NS"),
            FinancialSnapshot {
                symbol: "ZZZ.NS".to_string(),
                earnings_yield: Some(0.1),
                return_on_capital: Some(0.2),
                market_cap: Some(1),
                updated_at: None,
            },
        ]);

        let ranked = rank_stocks(&store, None).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].stock, "ZZZ.NS");
        assert_eq!(ranked[0].magic_formula_rank, 2);
        assert_eq!(ranked[0].rank, 1);
    }
}
