//! 공유 애플리케이션 상태.

use ranker_core::AuthConfig;
use ranker_data::SnapshotStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;

/// 모든 핸들러가 공유하는 상태.
pub struct AppState {
    /// 랭킹 엔드포인트가 읽는 스냅샷 저장소
    pub snapshots: Arc<dyn SnapshotStore>,
    /// API 키 검사 설정
    pub auth: AuthConfig,
    /// 준비 상태 확인용 풀 (테스트에서는 없음)
    pub db_pool: Option<PgPool>,
    pub version: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(snapshots: Arc<dyn SnapshotStore>, auth: AuthConfig) -> Self {
        Self {
            snapshots,
            auth,
            db_pool: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// [`create_test_state`]가 허용하는 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_API_KEY: &str = "test-api-key";

/// 인메모리 저장소와 [`TEST_API_KEY`]를 사용하는 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state(store: Arc<ranker_data::InMemoryStore>) -> AppState {
    AppState::new(store, AuthConfig::new(TEST_API_KEY))
}
