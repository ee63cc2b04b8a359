//! 랭커 에러 타입.

use thiserror::Error;

/// 랭커 핵심 에러.
#[derive(Debug, Error)]
pub enum RankerError {
    /// 요청 검증 실패 (예: 알 수 없는 시가총액 필터).
    #[error("{0}")]
    Validation(String),

    /// 저장소 읽기/쓰기 실패.
    #[error("Storage error: {0}")]
    Storage(String),

    /// 외부 데이터 프로바이더 실패.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// API 키 누락 또는 불일치
    #[error("Unauthorized access")]
    Unauthorized,

    /// 내부 에러
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 랭커 연산 결과 타입.
pub type RankerResult<T> = Result<T, RankerError>;

impl RankerError {
    /// 호출자에게 클라이언트 오류로 보고해야 하는 에러인지 여부.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RankerError::Validation(_) | RankerError::Unauthorized)
    }
}

impl From<config::ConfigError> for RankerError {
    fn from(err: config::ConfigError) -> Self {
        RankerError::Config(err.to_string())
    }
}
