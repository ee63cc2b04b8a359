//! 데이터 계층 에러 타입.

use ranker_core::RankerError;
use thiserror::Error;

/// 데이터 접근 에러.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 실패
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실패
    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 외부 소스 요청 실패
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 외부 소스 요청 제한 (429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 응답 파싱 실패
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Operation timeout: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // unique_violation
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<DataError> for RankerError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::FetchError(_)
            | DataError::RateLimited(_)
            | DataError::SymbolNotFound(_)
            | DataError::ParseError(_)
            | DataError::Timeout(_) => RankerError::Upstream(err.to_string()),
            _ => RankerError::Storage(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
