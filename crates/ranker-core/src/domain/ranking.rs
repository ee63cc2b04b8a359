//! 마법공식 랭킹.
//!
//! 종목마다 이익수익률과 자본수익률 각각에 대해 경쟁 순위를 매깁니다
//! (높을수록 좋고, 동점은 가장 낮은 순위를 공유). 종합 점수는 두 순위의
//! 합이며 결과는 종합 점수 오름차순입니다.

use serde::Serialize;

use super::market_cap::MarketCapCategory;
use super::snapshot::FinancialSnapshot;

/// 랭킹 결과 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStock {
    pub stock: String,
    #[serde(skip_serializing)]
    pub earnings_yield_rank: u32,
    #[serde(skip_serializing)]
    pub roc_rank: u32,
    pub magic_formula_rank: u32,
    /// 정렬 결과에서의 위치 (1부터)
    pub rank: usize,
    pub market_cap_category: MarketCapCategory,
}

/// 내림차순 "min" 경쟁 순위.
///
/// 값이 있으면 `1 + (더 큰 값의 개수)`입니다. 값이 없거나 NaN이면 모두
/// `1 + (값이 있는 개수)`를 공유하며, 값이 있는 항목보다 뒤에 옵니다.
pub fn competition_rank(values: &[Option<f64>]) -> Vec<u32> {
    let mut present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    present.sort_by(|a, b| b.total_cmp(a));

    let absent_rank = present.len() as u32 + 1;

    values
        .iter()
        .map(|value| match value {
            Some(v) if !v.is_nan() => present.partition_point(|w| w > v) as u32 + 1,
            _ => absent_rank,
        })
        .collect()
}

/// 스냅샷 행의 순위를 매깁니다. 시가총액 구간 하나로 제한할 수 있습니다.
///
/// 행은 심볼 순으로 들어온다고 가정하며, 종합 점수가 같으면 그 순서를
/// 유지합니다.
pub fn rank_snapshots(
    rows: &[FinancialSnapshot],
    filter: Option<MarketCapCategory>,
) -> Vec<RankedStock> {
    let selected: Vec<(&FinancialSnapshot, MarketCapCategory)> = rows
        .iter()
        .map(|row| (row, row.category()))
        .filter(|(_, category)| filter.map_or(true, |f| f == *category))
        .collect();

    let ey: Vec<Option<f64>> = selected.iter().map(|(r, _)| r.earnings_yield).collect();
    let roc: Vec<Option<f64>> = selected.iter().map(|(r, _)| r.return_on_capital).collect();
    let ey_ranks = competition_rank(&ey);
    let roc_ranks = competition_rank(&roc);

    let mut ranked: Vec<RankedStock> = selected
        .iter()
        .zip(ey_ranks.iter().zip(roc_ranks.iter()))
        .map(|((row, category), (&ey_rank, &roc_rank))| RankedStock {
            stock: row.symbol.clone(),
            earnings_yield_rank: ey_rank,
            roc_rank,
            magic_formula_rank: ey_rank + roc_rank,
            rank: 0,
            market_cap_category: *category,
        })
        .collect();

    // sort_by_key는 안정 정렬
    ranked.sort_by_key(|r| r.magic_formula_rank);

    for (i, stock) in ranked.iter_mut().enumerate() {
        stock.rank = i + 1;
    }

    ranked
}
