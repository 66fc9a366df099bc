//! Pipeline Context
//!
//! Owns the loaded artifacts and the prediction journal for one session.
//! Created once at startup, dropped once at shutdown; every call goes
//! through it instead of process-wide globals.
//!
//! Error policy:
//! - validation errors are returned and nothing else happens
//! - a model invocation error faults the pipeline until artifacts are reloaded
//! - a persistence error never hides a finished prediction

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::api::engine_status::{EngineStatus, JournalStatus, ModelStatus, RuntimeStatus};
use crate::error::{PersistenceError, PipelineError, PipelineResult, ValidationError};
use crate::logic::config::Config;
use crate::logic::features::{self, FeatureVector, LayoutInfo};
use crate::logic::journal::{PredictionLog, PredictionRecord, SqliteJournal};
use crate::logic::model::{self, ArtifactPaths, Artifacts, PredictionResult};

// ============================================================================
// SUBMISSION
// ============================================================================

/// Outcome of one form submission.
///
/// `result` is always present; `record` is `None` when the journal write
/// failed, with the reason in `log_error`.
#[derive(Debug)]
pub struct Submission {
    pub result: PredictionResult,
    pub record: Option<PredictionRecord>,
    pub log_error: Option<PersistenceError>,
}

impl Submission {
    pub fn is_logged(&self) -> bool {
        self.record.is_some()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline<L: PredictionLog = SqliteJournal> {
    artifacts: RwLock<Arc<Artifacts>>,
    log: L,
    fault: RwLock<Option<String>>,

    // Latency stats
    latency_sum_us: AtomicU64,
    prediction_count: AtomicU64,
}

impl Pipeline<SqliteJournal> {
    /// Load artifacts and open the journal named by `config`
    pub fn open(config: &Config) -> PipelineResult<Self> {
        let artifacts = Artifacts::load(&config.artifact_paths())?;
        let journal = SqliteJournal::open(&config.database_path)?;
        Ok(Self::new(artifacts, journal))
    }
}

impl<L: PredictionLog> Pipeline<L> {
    pub fn new(artifacts: Artifacts, log: L) -> Self {
        log::info!("Pipeline ready: model={}", artifacts.model_name());
        Self {
            artifacts: RwLock::new(Arc::new(artifacts)),
            log,
            fault: RwLock::new(None),
            latency_sum_us: AtomicU64::new(0),
            prediction_count: AtomicU64::new(0),
        }
    }

    /// Validate raw form input. Never touches the journal.
    pub fn parse(&self, raw: &HashMap<String, String>) -> PipelineResult<FeatureVector> {
        Ok(features::parse(raw)?)
    }

    /// Run the model. Never touches the journal.
    pub fn predict(&self, vector: &FeatureVector) -> PipelineResult<PredictionResult> {
        if let Some(reason) = self.fault.read().clone() {
            return Err(PipelineError::Faulted(reason));
        }

        let artifacts = self.artifacts();
        let start_time = Instant::now();

        match model::predict(vector, &artifacts) {
            Ok(result) => {
                let elapsed_us = start_time.elapsed().as_micros() as u64;
                self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
                self.prediction_count.fetch_add(1, Ordering::Relaxed);

                log::debug!(
                    "Prediction: {} (label={}, p={:.3}, {}us)",
                    result.risk, result.label, result.probability, elapsed_us
                );
                Ok(result)
            }
            Err(e) if e.is_input_error() => {
                log::warn!("Input rejected by the model: {}", e);
                Err(ValidationError::new("input", e.to_string()).into())
            }
            Err(e) => {
                log::warn!("Model fault, predictions disabled until reload: {}", e);
                *self.fault.write() = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Append one finished prediction to the journal
    pub fn record(&self, vector: &FeatureVector, result: &PredictionResult) -> PipelineResult<PredictionRecord> {
        Ok(self.log.record(vector, result)?)
    }

    /// All stored predictions, newest first
    pub fn history(&self) -> PipelineResult<Vec<PredictionRecord>> {
        Ok(self.log.history()?)
    }

    /// validate → predict → record
    pub fn submit(&self, raw: &HashMap<String, String>) -> PipelineResult<Submission> {
        let vector = self.parse(raw)?;
        log::debug!("Submission input: {}", vector.to_log_entry());
        let result = self.predict(&vector)?;

        let (record, log_error) = match self.log.record(&vector, &result) {
            Ok(record) => (Some(record), None),
            Err(e) => {
                log::warn!("Prediction not saved to history: {}", e);
                (None, Some(e))
            }
        };

        Ok(Submission { result, record, log_error })
    }

    /// Load a fresh artifact set and clear any fault.
    /// On failure the current artifacts and fault state are kept.
    pub fn reload_artifacts(&self, paths: &ArtifactPaths) -> PipelineResult<()> {
        let artifacts = Artifacts::load(paths)?;
        self.replace_artifacts(artifacts);
        Ok(())
    }

    /// Swap in an already-built artifact set and clear any fault
    pub fn replace_artifacts(&self, artifacts: Artifacts) {
        log::info!("Artifacts replaced: model={}", artifacts.model_name());
        *self.artifacts.write() = Arc::new(artifacts);
        *self.fault.write() = None;
    }

    /// Shared handle to the current artifact set
    pub fn artifacts(&self) -> Arc<Artifacts> {
        self.artifacts.read().clone()
    }

    pub fn journal(&self) -> &L {
        &self.log
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.read().is_some()
    }

    pub fn status(&self) -> EngineStatus {
        let artifacts = self.artifacts();
        let layout = LayoutInfo::current();

        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.prediction_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        let fault_reason = self.fault.read().clone();

        EngineStatus {
            feature_version: layout.version,
            layout_hash: layout.hash,
            feature_count: layout.feature_count,
            model: ModelStatus {
                engine: artifacts.classifier().kind().to_string(),
                scaler: artifacts.scaler().kind().to_string(),
                model_name: artifacts.model_name(),
                model_version: artifacts.manifest().and_then(|m| m.model_version.clone()),
                classes: artifacts.encoder().classes.clone(),
                loaded_at: artifacts.loaded_at().to_rfc3339(),
            },
            journal: JournalStatus {
                records: self.log.count().ok(),
            },
            runtime: RuntimeStatus {
                predictions_made: count,
                avg_latency_ms: avg,
                faulted: fault_reason.is_some(),
                fault_reason,
            },
        }
    }
}

impl<L: PredictionLog> Drop for Pipeline<L> {
    fn drop(&mut self) {
        log::info!(
            "Pipeline closed after {} prediction(s)",
            self.prediction_count.load(Ordering::Relaxed)
        );
    }
}
