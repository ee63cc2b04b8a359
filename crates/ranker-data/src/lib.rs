//! 주식 랭커 데이터 접근 계층.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 재무 데이터 및 거래소 상장 목록 프로바이더 트레이트
//! - Yahoo Finance 재무 데이터 클라이언트
//! - NSE 상장 종목 목록 클라이언트
//! - PostgreSQL 기반 스냅샷/유니버스 저장소
//! - 재시도를 포함한 연결 초기화 및 스키마 생성

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{
    nse::NseListingProvider, yahoo::YahooFundamentalsProvider, FundamentalsProvider,
    UniverseProvider,
};
pub use storage::{
    connect_with_retry, ensure_schema,
    postgres::{PgSnapshotStore, PgUniverseStore},
    SeedOutcome, SnapshotStore, UniverseStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::fixture::{StaticFundamentalsProvider, StaticUniverseProvider};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::InMemoryStore;
