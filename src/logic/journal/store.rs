//! SQLite Prediction Journal
//!
//! Append-only `predictions` table. One connection, opened once, guarded
//! by a mutex so ids stay monotonic and readers never see half a row.

use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row, TransactionBehavior};

use crate::error::PersistenceError;
use crate::logic::features::{FeatureVector, Sex};
use crate::logic::model::PredictionResult;
use crate::logic::risk::RiskLevel;
use super::record::{PredictionRecord, TIMESTAMP_FORMAT};
use super::PredictionLog;

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    gender TEXT NOT NULL,
    age INTEGER NOT NULL,
    urea REAL NOT NULL,
    cr REAL NOT NULL,
    hba1c REAL NOT NULL,
    chol REAL NOT NULL,
    tg REAL NOT NULL,
    hdl REAL NOT NULL,
    ldl REAL NOT NULL,
    vldl REAL NOT NULL,
    bmi REAL NOT NULL,
    prediction TEXT NOT NULL,
    probability REAL NOT NULL
);
"#;

const INSERT_SQL: &str = "INSERT INTO predictions (
    timestamp, gender, age, urea, cr, hba1c, chol, tg, hdl, ldl, vldl, bmi, prediction, probability
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

const HISTORY_SQL: &str = "SELECT
    id, timestamp, gender, age, urea, cr, hba1c, chol, tg, hdl, ldl, vldl, bmi, prediction, probability
FROM predictions
ORDER BY timestamp DESC, id DESC";

// ============================================================================
// JOURNAL
// ============================================================================

pub struct SqliteJournal {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteJournal {
    /// Open (or create) the history database at `path`
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // Commit must reach disk before `record` returns
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(SCHEMA_SQL)?;

        log::info!("Prediction journal opened: {:?}", path);
        Ok(Self { conn: Mutex::new(conn), path: Some(path.to_path_buf()) })
    }

    /// In-memory journal (for testing)
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn: Mutex::new(conn), path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Make every later write fail (for testing)
    #[cfg(test)]
    pub(crate) fn set_query_only(&self, on: bool) -> Result<(), PersistenceError> {
        self.conn.lock().pragma_update(None, "query_only", on)?;
        Ok(())
    }

    /// Raw insert bypassing domain types (for testing legacy rows)
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<(), PersistenceError> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }
}

impl PredictionLog for SqliteJournal {
    fn record(&self, vector: &FeatureVector, result: &PredictionResult) -> Result<PredictionRecord, PersistenceError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            INSERT_SQL,
            params![
                timestamp,
                vector.gender.as_str(),
                vector.age,
                vector.urea,
                vector.cr,
                vector.hba1c,
                vector.chol,
                vector.tg,
                vector.hdl,
                vector.ldl,
                vector.vldl,
                vector.bmi,
                result.label,
                result.probability,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log::debug!("Recorded prediction #{} ({})", id, result.risk);

        Ok(PredictionRecord {
            id,
            timestamp,
            features: *vector,
            label: result.label.clone(),
            risk: result.risk,
            probability: result.probability,
        })
    }

    fn history(&self) -> Result<Vec<PredictionRecord>, PersistenceError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(HISTORY_SQL)?;
        let rows = stmt.query_map([], StoredRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            // One unreadable row must not hide the rest of the history
            match row?.into_record() {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping history row: {}", e),
            }
        }
        Ok(records)
    }

    fn count(&self) -> Result<usize, PersistenceError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl Drop for SqliteJournal {
    fn drop(&mut self) {
        log::info!("Prediction journal closed: {:?}", self.path);
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

/// Column values as stored, before domain checks
struct StoredRow {
    id: i64,
    timestamp: String,
    gender: String,
    age: f64,
    values: [f64; 9],
    label: String,
    probability: f64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut values = [0.0; 9];
        for (i, v) in values.iter_mut().enumerate() {
            *v = row.get(4 + i)?;
        }

        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            gender: row.get(2)?,
            // Older builds could store a fractional age here
            age: row.get(3)?,
            values,
            label: row.get(13)?,
            probability: row.get(14)?,
        })
    }

    fn into_record(self) -> Result<PredictionRecord, PersistenceError> {
        let corrupt = |reason: &str| PersistenceError::CorruptRow { id: self.id, reason: reason.to_string() };

        let gender = Sex::from_stored_label(&self.gender).ok_or_else(|| corrupt("unknown gender"))?;
        if !self.age.is_finite() || self.age < 1.0 {
            return Err(corrupt("age out of range"));
        }

        let [urea, cr, hba1c, chol, tg, hdl, ldl, vldl, bmi] = self.values;

        Ok(PredictionRecord {
            id: self.id,
            features: FeatureVector {
                gender,
                age: self.age as u32,
                urea,
                cr,
                hba1c,
                chol,
                tg,
                hdl,
                ldl,
                vldl,
                bmi,
            },
            risk: RiskLevel::from_stored_label(&self.label),
            label: self.label,
            probability: self.probability,
            timestamp: self.timestamp,
        })
    }
}
