//! 갱신 작업 주기 스케줄러.
//!
//! 각 스케줄러는 별도 태스크로 실행됩니다. 초기 대기 후 작업을 한 번
//! 실행하고, 토큰이 취소될 때까지 주기마다 실행합니다. 놓친 tick은
//! 몰아서 실행하지 않고 건너뜁니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::modules::{RefreshJob, UniverseJob};

/// 허용하는 최소 주기. `tokio::time::interval`은 0이면 panic합니다.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// 재무 데이터 갱신 루프를 시작합니다.
pub fn start_refresh_scheduler(
    job: Arc<RefreshJob>,
    initial_delay: Duration,
    period: Duration,
    shutdown_token: CancellationToken,
) -> JoinHandle<()> {
    spawn_periodic(
        "fundamentals refresh",
        initial_delay,
        period,
        shutdown_token,
        move |token| {
            let job = job.clone();
            async move {
                job.run(&token).await.log_summary();
            }
        },
    )
}

/// 유니버스 갱신 루프를 시작합니다.
pub fn start_universe_scheduler(
    job: Arc<UniverseJob>,
    initial_delay: Duration,
    period: Duration,
    shutdown_token: CancellationToken,
) -> JoinHandle<()> {
    spawn_periodic(
        "universe refresh",
        initial_delay,
        period,
        shutdown_token,
        move |_| {
            let job = job.clone();
            async move {
                job.run().await.log_summary();
            }
        },
    )
}

fn spawn_periodic<F, Fut>(
    name: &'static str,
    initial_delay: Duration,
    period: Duration,
    shutdown_token: CancellationToken,
    run: F,
) -> JoinHandle<()>
where
    F: Fn(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if period < MIN_PERIOD {
        warn!(job = name, period_ms = period.as_millis() as u64, "Interval too short, using 1s");
    }
    let period = period.max(MIN_PERIOD);

    tokio::spawn(async move {
        info!(
            job = name,
            initial_delay_secs = initial_delay.as_secs(),
            interval_secs = period.as_secs(),
            "Scheduler started"
        );

        tokio::select! {
            _ = tokio::time::sleep(initial_delay) => {}
            _ = shutdown_token.cancelled() => {
                info!(job = name, "Scheduler stopped before first run");
                return;
            }
        }

        // 첫 tick은 즉시 완료
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run(shutdown_token.clone()).await;
                }
                _ = shutdown_token.cancelled() => break,
            }
        }

        info!(job = name, "Scheduler stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranker_core::RefreshConfig;
    use ranker_data::{InMemoryStore, StaticFundamentalsProvider, StaticUniverseProvider};

    #[tokio::test(start_paused = true)]
    async fn test_refresh_scheduler_runs_then_stops() {
        let store = Arc::new(InMemoryStore::new().with_universe(["A.NS"]));
        let provider = Arc::new(StaticFundamentalsProvider::new());
        let job = Arc::new(RefreshJob::new(
            provider.clone(),
            store.clone(),
            store,
            RefreshConfig::default(),
        ));
        let token = CancellationToken::new();

        let handle = start_refresh_scheduler(
            job,
            Duration::from_secs(1),
            Duration::from_secs(3600),
            token.clone(),
        );

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(provider.calls(), vec!["A.NS"]);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_universe_scheduler_cancelled_during_initial_delay() {
        let store = Arc::new(InMemoryStore::new());
        let job = Arc::new(UniverseJob::new(
            Arc::new(StaticUniverseProvider::new(["A.NS"])),
            store.clone(),
        ));
        let token = CancellationToken::new();

        let handle = start_universe_scheduler(
            job,
            Duration::from_secs(60),
            Duration::from_secs(3600),
            token.clone(),
        );
        token.cancel();
        handle.await.unwrap();

        assert!(store.universe_symbols().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let store = Arc::new(InMemoryStore::new());
        let job = Arc::new(UniverseJob::new(
            Arc::new(StaticUniverseProvider::new(["A.NS"])),
            store.clone(),
        ));
        let token = CancellationToken::new();

        let handle = start_universe_scheduler(job, Duration::ZERO, Duration::ZERO, token.clone());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.universe_symbols(), vec!["A.NS"]);

        token.cancel();
        handle.await.unwrap();
    }
}
