//! PostgreSQL 기반 저장소.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use ranker_core::{FinancialSnapshot, MetricSet};
use sqlx::PgPool;
use tracing::debug;

use super::{SeedOutcome, SnapshotStore, UniverseStore};
use crate::error::Result;

type SnapshotRow = (
    String,
    Option<f64>,
    Option<f64>,
    Option<i64>,
    Option<NaiveDateTime>,
);

/// `stock_financials` 테이블.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn load_rankable(&self) -> Result<Vec<FinancialSnapshot>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT stock_symbol, earnings_yield, return_on_capital, market_cap, updated_at
            FROM stock_financials
            WHERE earnings_yield IS NOT NULL AND return_on_capital IS NOT NULL
            ORDER BY stock_symbol
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(symbol, earnings_yield, return_on_capital, market_cap, updated_at)| {
                    FinancialSnapshot {
                        symbol,
                        earnings_yield,
                        return_on_capital,
                        market_cap,
                        updated_at,
                    }
                },
            )
            .collect())
    }

    async fn upsert_batch(
        &self,
        rows: &[(String, MetricSet)],
        updated_at: NaiveDateTime,
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let symbols: Vec<&str> = rows.iter().map(|(s, _)| s.as_str()).collect();
        let yields: Vec<f64> = rows.iter().map(|(_, m)| m.earnings_yield).collect();
        let returns: Vec<f64> = rows.iter().map(|(_, m)| m.return_on_capital).collect();
        let caps: Vec<i64> = rows.iter().map(|(_, m)| m.market_cap).collect();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO stock_financials
                (stock_symbol, earnings_yield, return_on_capital, market_cap, updated_at)
            SELECT symbol, ey, roc, cap, $5
            FROM UNNEST($1::text[], $2::float8[], $3::float8[], $4::int8[])
                AS t(symbol, ey, roc, cap)
            ON CONFLICT (stock_symbol) DO UPDATE SET
                earnings_yield = EXCLUDED.earnings_yield,
                return_on_capital = EXCLUDED.return_on_capital,
                market_cap = EXCLUDED.market_cap,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&symbols)
        .bind(&yields)
        .bind(&returns)
        .bind(&caps)
        .bind(updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(rows = rows.len(), affected = result.rows_affected(), "Upserted snapshots");
        Ok(result.rows_affected())
    }

    async fn delete_batch(&self, symbols: &[String]) -> Result<u64> {
        if symbols.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM stock_financials WHERE stock_symbol = ANY($1)")
            .bind(symbols)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(requested = symbols.len(), affected = result.rows_affected(), "Deleted snapshots");
        Ok(result.rows_affected())
    }
}

/// `nse_stocks` 테이블. `stock_financials` 빈 행 시딩도 담당합니다.
#[derive(Debug, Clone)]
pub struct PgUniverseStore {
    pool: PgPool,
}

impl PgUniverseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UniverseStore for PgUniverseStore {
    async fn load_symbols(&self) -> Result<Vec<String>> {
        let symbols: Vec<String> =
            sqlx::query_scalar("SELECT stock_symbol FROM nse_stocks ORDER BY stock_symbol")
                .fetch_all(&self.pool)
                .await?;
        Ok(symbols)
    }

    async fn seed_symbols(&self, symbols: &[String]) -> Result<SeedOutcome> {
        if symbols.is_empty() {
            return Ok(SeedOutcome::default());
        }

        let mut tx = self.pool.begin().await?;

        let universe = sqlx::query(
            r#"
            INSERT INTO nse_stocks (stock_symbol)
            SELECT * FROM UNNEST($1::text[])
            ON CONFLICT (stock_symbol) DO NOTHING
            "#,
        )
        .bind(symbols)
        .execute(&mut *tx)
        .await?;

        let snapshots = sqlx::query(
            r#"
            INSERT INTO stock_financials (stock_symbol)
            SELECT * FROM UNNEST($1::text[])
            ON CONFLICT (stock_symbol) DO NOTHING
            "#,
        )
        .bind(symbols)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SeedOutcome {
            new_symbols: universe.rows_affected(),
            seeded_snapshots: snapshots.rows_affected(),
        })
    }
}
