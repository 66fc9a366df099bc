//! Prediction Journal
//!
//! Persistent, append-only log of completed predictions.
//!
//! ## Structure
//! - `record.rs` - PredictionRecord (immutable, timestamped)
//! - `store.rs` - SQLite-backed journal
//! - `export.rs` - Export history to JSONL / JSON / CSV, risk summary

pub mod record;
pub mod store;
pub mod export;

#[cfg(test)]
mod tests;

pub use record::{PredictionRecord, TIMESTAMP_FORMAT};
pub use store::SqliteJournal;
pub use export::{export_history, summarize, ExportFormat, HistorySummary};

use crate::error::PersistenceError;
use crate::logic::features::FeatureVector;
use crate::logic::model::PredictionResult;

/// Storage seam for the pipeline.
///
/// `record` is atomic: the row is durably committed or nothing is written.
/// There is no update or delete.
pub trait PredictionLog {
    fn record(&self, vector: &FeatureVector, result: &PredictionResult) -> Result<PredictionRecord, PersistenceError>;

    /// All records, newest first. Read fresh on every call.
    fn history(&self) -> Result<Vec<PredictionRecord>, PersistenceError>;

    fn count(&self) -> Result<usize, PersistenceError> {
        Ok(self.history()?.len())
    }
}
