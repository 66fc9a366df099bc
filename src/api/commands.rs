//! Front-end Commands
//!
//! Serializable request/response types and thin command functions over a
//! `Pipeline`. A front end (desktop shell, web handler, ...) calls these and
//! renders the views; no presentation logic lives in the core.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::engine_status::EngineStatus;
use crate::error::{ErrorKind, PersistenceError, PipelineError};
use crate::logic::journal::{self, ExportFormat, HistorySummary, PredictionLog, PredictionRecord};
use crate::logic::model::ArtifactPaths;
use crate::logic::pipeline::{Pipeline, Submission};
use crate::logic::risk::RiskLevel;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Raw form fields as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Prediction result for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionView {
    pub risk: RiskLevel,
    pub severity_level: u8,
    pub headline: String,
    pub recommendation: String,
    pub label: String,
    pub probability: f64,
    pub probability_percent: String,
    pub record_id: Option<i64>,
    pub logged: bool,
    /// Shown as a warning next to the result, never instead of it
    pub log_error: Option<String>,
}

impl From<Submission> for PredictionView {
    fn from(s: Submission) -> Self {
        let risk = s.result.risk;
        Self {
            risk,
            severity_level: risk.severity_level(),
            headline: risk.headline().to_string(),
            recommendation: risk.recommendation().to_string(),
            label: s.result.label,
            probability: s.result.probability,
            probability_percent: percent(s.result.probability),
            record_id: s.record.as_ref().map(|r| r.id),
            logged: s.record.is_some(),
            log_error: s.log_error.map(|e| PipelineError::from(e).user_message().to_string()),
        }
    }
}

/// One row of the history table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub id: i64,
    pub timestamp: String,
    pub gender: String,
    pub age: u32,
    pub urea: f64,
    pub cr: f64,
    pub hba1c: f64,
    pub chol: f64,
    pub tg: f64,
    pub hdl: f64,
    pub ldl: f64,
    pub vldl: f64,
    pub bmi: f64,
    pub label: String,
    pub risk: RiskLevel,
    pub probability_percent: String,
}

impl From<&PredictionRecord> for HistoryRow {
    fn from(r: &PredictionRecord) -> Self {
        let f = &r.features;
        Self {
            id: r.id,
            timestamp: r.timestamp.clone(),
            gender: f.gender.to_string(),
            age: f.age,
            urea: f.urea,
            cr: f.cr,
            hba1c: f.hba1c,
            chol: f.chol,
            tg: f.tg,
            hdl: f.hdl,
            ldl: f.ldl,
            vldl: f.vldl,
            bmi: f.bmi,
            label: r.label.clone(),
            risk: r.risk,
            probability_percent: percent(r.probability),
        }
    }
}

/// Error for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
    pub recoverable: bool,
}

impl From<PipelineError> for ErrorView {
    fn from(e: PipelineError) -> Self {
        Self {
            kind: e.kind(),
            message: e.user_message().to_string(),
            recoverable: e.is_recoverable(),
        }
    }
}

fn percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

// ============================================================================
// PREDICTION COMMANDS
// ============================================================================

/// Validate, predict and log one form submission
pub fn submit_form<L: PredictionLog>(pipeline: &Pipeline<L>, input: &FormInput) -> Result<PredictionView, ErrorView> {
    pipeline
        .submit(&input.fields)
        .map(PredictionView::from)
        .map_err(ErrorView::from)
}

/// Reload artifacts from a directory (clears a model fault on success)
pub fn reload_model<L: PredictionLog>(pipeline: &Pipeline<L>, artifact_dir: &Path) -> Result<EngineStatus, ErrorView> {
    pipeline.reload_artifacts(&ArtifactPaths::in_dir(artifact_dir))?;
    Ok(pipeline.status())
}

pub fn get_engine_status<L: PredictionLog>(pipeline: &Pipeline<L>) -> EngineStatus {
    pipeline.status()
}

// ============================================================================
// HISTORY COMMANDS
// ============================================================================

/// History table rows, newest first
pub fn get_history<L: PredictionLog>(pipeline: &Pipeline<L>) -> Result<Vec<HistoryRow>, ErrorView> {
    let records = pipeline.history()?;
    Ok(records.iter().map(HistoryRow::from).collect())
}

/// Risk distribution over the whole history
pub fn get_history_summary<L: PredictionLog>(pipeline: &Pipeline<L>) -> Result<HistorySummary, ErrorView> {
    let records = pipeline.history()?;
    Ok(journal::summarize(&records))
}

/// Write the history to `destination`, returns rows written
pub fn export_history<L: PredictionLog>(
    pipeline: &Pipeline<L>,
    destination: &Path,
    format: ExportFormat,
) -> Result<usize, ErrorView> {
    let records = pipeline.history()?;
    journal::export_history(&records, destination, format)
        .map_err(|e| ErrorView::from(PipelineError::from(PersistenceError::from(e))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureVector;
    use crate::logic::journal::SqliteJournal;
    use crate::logic::model::{Artifacts, LabelEncoder, LogisticRegression, PredictionResult, Scaler};

    fn pipeline() -> Pipeline {
        let mut y = vec![0.0; 11];
        y[4] = 1.0;
        let model = LogisticRegression {
            coef: vec![vec![0.0; 11], vec![0.0; 11], y],
            intercept: vec![0.0, 0.0, -6.0],
        };
        let scaler = Scaler::MinMax {
            data_min: vec![0.0; 11],
            data_max: vec![1.0; 11],
            feature_names: None,
        };
        let artifacts = Artifacts::from_parts(scaler, LabelEncoder::new(["N", "P", "Y"]), Box::new(model)).unwrap();
        Pipeline::new(artifacts, SqliteJournal::open_in_memory().unwrap())
    }

    fn input() -> FormInput {
        [
            ("gender", "male"),
            ("age", "61"),
            ("urea", "6.2"),
            ("cr", "80"),
            ("hba1c", "10.2"),
            ("chol", "5.6"),
            ("tg", "2.4"),
            ("hdl", "0.9"),
            ("ldl", "3.5"),
            ("vldl", "1.1"),
            ("bmi", "33"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_submit_form_view() {
        let pipeline = pipeline();
        let view = submit_form(&pipeline, &input()).unwrap();

        assert_eq!(view.risk, RiskLevel::High);
        assert_eq!(view.label, "Y");
        assert!(view.logged);
        assert!(view.record_id.is_some());
        assert!(view.probability_percent.ends_with('%'));
        assert_eq!(view.headline, RiskLevel::High.headline());

        let rows = get_history(&pipeline).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gender, "male");
        assert_eq!(rows[0].probability_percent, view.probability_percent);
    }

    #[test]
    fn test_invalid_form_error_view() {
        let pipeline = pipeline();
        let mut form = input();
        form.fields.insert("bmi".into(), "tall".into());

        let err = submit_form(&pipeline, &form).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.recoverable);
        assert!(!err.message.contains("tall"));
    }

    #[test]
    fn test_form_input_from_json() {
        let json = r#"{"gender":"female","age":"30","bmi":"21.5"}"#;
        let form: FormInput = serde_json::from_str(json).unwrap();
        assert_eq!(form.fields.len(), 3);
        assert_eq!(form.fields["bmi"], "21.5");
    }

    #[test]
    fn test_percent_format() {
        assert_eq!(percent(0.875), "87.5%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn test_history_row_from_record() {
        let pipeline = pipeline();
        let vector: FeatureVector = pipeline.parse(&input().fields).unwrap();
        let result = PredictionResult { risk: RiskLevel::Low, label: "N".into(), probability: 0.5 };
        let record = pipeline.record(&vector, &result).unwrap();

        let row = HistoryRow::from(&record);
        assert_eq!(row.id, record.id);
        assert_eq!(row.age, 61);
        assert_eq!(row.probability_percent, "50.0%");

        let summary = get_history_summary(&pipeline).unwrap();
        assert_eq!(summary.low_count, 1);
    }
}
