//! 시가총액 구간.
//!
//! 아래 임계값으로 위에서부터 차례로 판정합니다. MID와 SMALL 구간은
//! 모두 닫힌 구간이라 정확히 50B는 둘 다 만족하지만, MID를 먼저 검사하므로
//! MID가 됩니다. 정확히 200B는 LARGE의 초과 조건을 만족하지 않아 MID입니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RankerError;

/// LARGE 하한 (미포함).
pub const LARGE_CAP_FLOOR: i64 = 200_000_000_000;
/// MID 하한 (포함).
pub const MID_CAP_FLOOR: i64 = 50_000_000_000;
/// SMALL 하한 (포함).
pub const SMALL_CAP_FLOOR: i64 = 5_000_000_000;

/// 파생 시가총액 구간. 저장하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapCategory {
    #[serde(rename = "LARGE")]
    Large,
    #[serde(rename = "MID")]
    Mid,
    #[serde(rename = "SMALL")]
    Small,
    #[serde(rename = "NO CAP")]
    NoCap,
}

impl MarketCapCategory {
    /// 시가총액 값을 분류합니다. 값이 없으면 `NoCap`입니다.
    pub fn classify(market_cap: Option<i64>) -> Self {
        match market_cap {
            Some(v) if v > LARGE_CAP_FLOOR => Self::Large,
            Some(v) if (MID_CAP_FLOOR..=LARGE_CAP_FLOOR).contains(&v) => Self::Mid,
            Some(v) if (SMALL_CAP_FLOOR..=MID_CAP_FLOOR).contains(&v) => Self::Small,
            _ => Self::NoCap,
        }
    }

    /// 응답에 쓰는 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "LARGE",
            Self::Mid => "MID",
            Self::Small => "SMALL",
            Self::NoCap => "NO CAP",
        }
    }
}

impl fmt::Display for MarketCapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 선택적인 `marketCap` 요청 필터를 파싱합니다.
///
/// `LARGE`, `MID`, `SMALL`만 허용합니다 (대소문자 구분, 정확히 일치).
/// `None`과 빈 문자열은 "필터 없음"입니다.
pub fn parse_market_cap_filter(
    value: Option<&str>,
) -> Result<Option<MarketCapCategory>, RankerError> {
    match value {
        None | Some("") => Ok(None),
        Some("LARGE") => Ok(Some(MarketCapCategory::Large)),
        Some("MID") => Ok(Some(MarketCapCategory::Mid)),
        Some("SMALL") => Ok(Some(MarketCapCategory::Small)),
        Some(_) => Err(RankerError::Validation("Market Cap not in List".to_string())),
    }
}
