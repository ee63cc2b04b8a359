//! API 프로세스가 소유하는 백그라운드 갱신 작업.

use ranker_collector::{start_refresh_scheduler, start_universe_scheduler, RefreshJob, UniverseJob};
use ranker_core::AppConfig;
use ranker_data::{
    DataError, NseListingProvider, PgSnapshotStore, PgUniverseStore, YahooFundamentalsProvider,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// PostgreSQL 기반 유니버스/재무 데이터 작업을 만들고 스케줄러를 시작합니다.
/// `shutdown_token`이 취소되면 둘 다 종료됩니다.
pub fn start_background_jobs(
    pool: PgPool,
    config: &AppConfig,
    shutdown_token: CancellationToken,
) -> Result<Vec<JoinHandle<()>>, DataError> {
    let snapshots = Arc::new(PgSnapshotStore::new(pool.clone()));
    let universe = Arc::new(PgUniverseStore::new(pool));

    let universe_job = Arc::new(UniverseJob::new(
        Arc::new(NseListingProvider::new(
            config.universe.listing_url.clone(),
            config.universe.symbol_suffix.clone(),
        )?),
        universe.clone(),
    ));
    let refresh_job = Arc::new(RefreshJob::new(
        Arc::new(YahooFundamentalsProvider::new()?),
        snapshots,
        universe,
        config.refresh.clone(),
    ));

    info!(
        universe_interval_secs = config.universe.interval_secs,
        refresh_interval_secs = config.refresh.interval_secs,
        "Starting background jobs"
    );

    Ok(vec![
        start_universe_scheduler(
            universe_job,
            config.universe.initial_delay(),
            config.universe.interval(),
            shutdown_token.clone(),
        ),
        start_refresh_scheduler(
            refresh_job,
            config.refresh.initial_delay(),
            config.refresh.interval(),
            shutdown_token,
        ),
    ])
}
