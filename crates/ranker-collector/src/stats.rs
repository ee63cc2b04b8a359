//! 작업 통계.

use ranker_core::SkipReason;
use serde::Serialize;
use std::time::Duration;

/// 재무 데이터 갱신 1회 결과.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    /// 입력 심볼 수
    pub total: usize,
    /// 종료 전까지 실제 처리한 심볼 수
    pub processed: usize,
    /// 지표 계산에 성공한 심볼 수
    pub fetched: usize,
    /// 이번 주기에 건너뛴 심볼 수
    pub skipped: usize,
    pub fetch_errors: usize,
    pub timeouts: usize,
    pub market_cap_missing: usize,
    pub missing_data: usize,
    /// upsert 배치로 기록된 행 수
    pub upserted: u64,
    /// delete 배치로 삭제된 행 수
    pub deleted: u64,
    pub upsert_error: Option<String>,
    pub delete_error: Option<String>,
    /// 취소 토큰으로 중단되었는지 여부
    pub cancelled: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_skip(&mut self, reason: &SkipReason) {
        self.skipped += 1;
        match reason {
            SkipReason::FetchError(_) => self.fetch_errors += 1,
            SkipReason::Timeout => self.timeouts += 1,
            SkipReason::MarketCapMissing => self.market_cap_missing += 1,
            SkipReason::MissingFinancialData => self.missing_data += 1,
        }
    }

    /// 처리한 심볼 중 지표 계산 성공 비율 (%).
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.fetched as f64 / self.processed as f64) * 100.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            processed = self.processed,
            fetched = self.fetched,
            skipped = self.skipped,
            fetch_errors = self.fetch_errors,
            timeouts = self.timeouts,
            market_cap_missing = self.market_cap_missing,
            missing_data = self.missing_data,
            upserted = self.upserted,
            deleted = self.deleted,
            upsert_failed = self.upsert_error.is_some(),
            delete_failed = self.delete_error.is_some(),
            cancelled = self.cancelled,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "Fundamentals refresh finished"
        );
    }
}

/// 유니버스 갱신 1회 결과.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UniverseStats {
    /// 가져온 상장 목록의 심볼 수
    pub listed: usize,
    pub new_symbols: u64,
    pub seeded_snapshots: u64,
    pub error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl UniverseStats {
    pub fn log_summary(&self) {
        match &self.error {
            None => tracing::info!(
                listed = self.listed,
                new_symbols = self.new_symbols,
                seeded_snapshots = self.seeded_snapshots,
                elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
                "Universe refresh finished"
            ),
            Some(error) => tracing::error!(
                listed = self.listed,
                error = %error,
                elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
                "Universe refresh failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_skip_counts_by_reason() {
        let mut stats = RefreshStats::new(4);
        stats.record_skip(&SkipReason::Timeout);
        stats.record_skip(&SkipReason::FetchError("HTTP 500".into()));
        stats.record_skip(&SkipReason::MissingFinancialData);

        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.fetch_errors, 1);
        assert_eq!(stats.missing_data, 1);
        assert_eq!(stats.market_cap_missing, 0);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = RefreshStats::new(4);
        assert_eq!(stats.success_rate(), 0.0);
        stats.processed = 4;
        stats.fetched = 3;
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
    }
}
