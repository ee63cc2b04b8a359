//! 주식 랭커 백그라운드 작업.
//!
//! 스냅샷 테이블을 최신 상태로 유지합니다:
//! - 거래소 상장 목록으로 심볼 유니버스 갱신
//! - 재무 데이터 갱신 (조회, 지표 산출, upsert 또는 delete)
//! - 두 작업의 주기 스케줄러

pub mod error;
pub mod modules;
pub mod scheduler;
pub mod stats;

pub use error::{CollectorError, Result};
pub use modules::{fetch_metrics, RefreshJob, UniverseJob};
pub use scheduler::{start_refresh_scheduler, start_universe_scheduler};
pub use stats::{RefreshStats, UniverseStats};
