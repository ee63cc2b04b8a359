//! 수집기 에러 타입.

use ranker_data::DataError;
use std::fmt;

/// 수집기 에러.
#[derive(Debug)]
pub enum CollectorError {
    /// 데이터베이스 연결 또는 쿼리 실패
    Database(DataError),
    /// 설정 누락 또는 오류
    Config(String),
    /// 데이터 프로바이더 실패 (Yahoo, NSE)
    DataSource(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::DataSource(msg) => write!(f, "Data source error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::FetchError(_)
            | DataError::RateLimited(_)
            | DataError::SymbolNotFound(_)
            | DataError::ParseError(_)
            | DataError::Timeout(_) => Self::DataSource(err.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Result 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
