//! # Ranker Core
//!
//! 마법공식(Magic Formula) 주식 랭커의 핵심 도메인 모델.
//!
//! 수집기와 API 서버가 공유하는 기본 구성 요소를 제공합니다:
//! - 재무 스냅샷 및 랭킹 결과 타입
//! - 시가총액 구간
//! - 재무제표 원본에서 이익수익률/자본수익률 산출
//! - 마법공식 랭킹 엔진
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
