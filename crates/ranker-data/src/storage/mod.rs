//! 영속 저장소.
//!
//! 두 테이블을 사용합니다:
//! - `nse_stocks`: 추가만 되는 심볼 유니버스
//! - `stock_financials`: 심볼당 스냅샷 한 행

use async_trait::async_trait;
use chrono::NaiveDateTime;
use ranker_core::{DatabaseConfig, FinancialSnapshot, MetricSet};
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{DataError, Result};

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

/// 연결 재시도 백오프 상한.
const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);

/// PostgreSQL SQLSTATE `invalid_catalog_name` (데이터베이스 없음).
const MISSING_DATABASE_CODE: &str = "3D000";

/// 심볼 키 스냅샷 행 저장소.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 두 비율이 모두 있는 행을 심볼 순으로 반환합니다. 유니버스 작업이
    /// 시딩한 빈 행은 제외됩니다.
    async fn load_rankable(&self) -> Result<Vec<FinancialSnapshot>>;

    /// 심볼별 지표를 하나의 트랜잭션으로 삽입하거나 덮어씁니다.
    async fn upsert_batch(
        &self,
        rows: &[(String, MetricSet)],
        updated_at: NaiveDateTime,
    ) -> Result<u64>;

    /// `symbols`의 행을 하나의 트랜잭션으로 삭제합니다. 없는 심볼은
    /// 무시합니다.
    async fn delete_batch(&self, symbols: &[String]) -> Result<u64>;
}

/// 유니버스 시딩 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// 유니버스에 새로 추가된 심볼 수
    pub new_symbols: u64,
    /// 생성된 빈 스냅샷 행 수
    pub seeded_snapshots: u64,
}

/// 추적 중인 심볼 유니버스.
#[async_trait]
pub trait UniverseStore: Send + Sync {
    /// 추적 중인 전체 심볼 (정렬됨).
    async fn load_symbols(&self) -> Result<Vec<String>>;

    /// 아직 추적하지 않는 심볼을 추가하고, 스냅샷 행이 없는 심볼에 빈 행을
    /// 만듭니다. 기존 행은 건드리지 않습니다.
    async fn seed_symbols(&self, symbols: &[String]) -> Result<SeedOutcome>;
}

/// 제한된 지수 백오프로 PostgreSQL에 연결합니다.
///
/// 데이터베이스가 없으면 한 번 생성한 뒤 다시 연결합니다.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    let max_attempts = config.connect_max_attempts.max(1);
    let mut backoff = config.connect_backoff();
    let mut create_tried = false;
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "Database connection established");
                return Ok(pool);
            }
            Err(err) => err,
        };

        if !create_tried && is_missing_database(&err) {
            create_tried = true;
            match sqlx::Postgres::create_database(&config.url).await {
                Ok(()) => {
                    info!("Database did not exist and was created");
                    continue;
                }
                Err(create_err) => warn!(error = %create_err, "Failed to create database"),
            }
        }

        if attempt >= max_attempts {
            return Err(DataError::ConnectionError(format!(
                "giving up after {attempt} attempts: {err}"
            )));
        }

        warn!(
            attempt,
            max_attempts,
            backoff_ms = backoff.as_millis() as u64,
            error = %err,
            "Database connection failed, retrying"
        );
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_CONNECT_BACKOFF);
    }
}

fn is_missing_database(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(MISSING_DATABASE_CODE),
        _ => false,
    }
}

/// 테이블과 인덱스가 없으면 생성합니다.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS nse_stocks (
            id SERIAL PRIMARY KEY,
            stock_symbol TEXT UNIQUE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stock_symbol ON nse_stocks (stock_symbol)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stock_financials (
            stock_symbol TEXT PRIMARY KEY,
            earnings_yield FLOAT,
            return_on_capital FLOAT,
            market_cap BIGINT,
            updated_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}

/// 가벼운 연결 확인 쿼리.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
