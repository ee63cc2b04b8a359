//! 작업 본체.

pub mod fundamental_sync;
pub mod symbol_sync;

pub use fundamental_sync::{fetch_metrics, RefreshJob};
pub use symbol_sync::UniverseJob;
