//! 테스트용 인메모리 저장소.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use ranker_core::{FinancialSnapshot, MetricSet};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{SeedOutcome, SnapshotStore, UniverseStore};
use crate::error::{DataError, Result};

/// 두 테이블을 맵으로 보관합니다. 연산별로 실패를 주입할 수 있습니다.
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: Mutex<BTreeMap<String, FinancialSnapshot>>,
    universe: Mutex<BTreeSet<String>>,
    fail_load: AtomicBool,
    fail_upsert: AtomicBool,
    fail_delete: AtomicBool,
    fail_seed: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(self, rows: impl IntoIterator<Item = FinancialSnapshot>) -> Self {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            for row in rows {
                snapshots.insert(row.symbol.clone(), row);
            }
        }
        self
    }

    pub fn with_universe<S: Into<String>>(self, symbols: impl IntoIterator<Item = S>) -> Self {
        if let Ok(mut universe) = self.universe.lock() {
            universe.extend(symbols.into_iter().map(Into::into));
        }
        self
    }

    pub fn snapshot(&self, symbol: &str) -> Option<FinancialSnapshot> {
        self.snapshots.lock().ok()?.get(symbol).cloned()
    }

    pub fn snapshot_symbols(&self) -> Vec<String> {
        self.snapshots
            .lock()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn universe_symbols(&self) -> Vec<String> {
        self.universe
            .lock()
            .map(|u| u.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_seed(&self, fail: bool) {
        self.fail_seed.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(DataError::QueryError(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }

    fn lock_snapshots(&self) -> Result<MutexGuard<'_, BTreeMap<String, FinancialSnapshot>>> {
        self.snapshots
            .lock()
            .map_err(|_| DataError::QueryError("snapshot map poisoned".to_string()))
    }

    fn lock_universe(&self) -> Result<MutexGuard<'_, BTreeSet<String>>> {
        self.universe
            .lock()
            .map_err(|_| DataError::QueryError("universe set poisoned".to_string()))
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load_rankable(&self) -> Result<Vec<FinancialSnapshot>> {
        Self::check(&self.fail_load, "load")?;
        Ok(self
            .lock_snapshots()?
            .values()
            .filter(|row| row.is_rankable())
            .cloned()
            .collect())
    }

    async fn upsert_batch(
        &self,
        rows: &[(String, MetricSet)],
        updated_at: NaiveDateTime,
    ) -> Result<u64> {
        Self::check(&self.fail_upsert, "upsert")?;
        let mut snapshots = self.lock_snapshots()?;
        for (symbol, metrics) in rows {
            snapshots.insert(
                symbol.clone(),
                FinancialSnapshot::from_metrics(symbol.clone(), metrics, updated_at),
            );
        }
        Ok(rows.len() as u64)
    }

    async fn delete_batch(&self, symbols: &[String]) -> Result<u64> {
        Self::check(&self.fail_delete, "delete")?;
        let mut snapshots = self.lock_snapshots()?;
        Ok(symbols
            .iter()
            .filter(|s| snapshots.remove(s.as_str()).is_some())
            .count() as u64)
    }
}

#[async_trait]
impl UniverseStore for InMemoryStore {
    async fn load_symbols(&self) -> Result<Vec<String>> {
        Self::check(&self.fail_load, "load")?;
        Ok(self.lock_universe()?.iter().cloned().collect())
    }

    async fn seed_symbols(&self, symbols: &[String]) -> Result<SeedOutcome> {
        Self::check(&self.fail_seed, "seed")?;
        let mut universe = self.lock_universe()?;
        let mut snapshots = self.lock_snapshots()?;

        let mut outcome = SeedOutcome::default();
        for symbol in symbols {
            if universe.insert(symbol.clone()) {
                outcome.new_symbols += 1;
            }
            if !snapshots.contains_key(symbol) {
                snapshots.insert(symbol.clone(), FinancialSnapshot::blank(symbol.clone()));
                outcome.seeded_snapshots += 1;
            }
        }
        Ok(outcome)
    }
}
