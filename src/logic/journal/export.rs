//! History Exporter
//!
//! Export stored predictions for analysis outside the app.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::logic::risk::RiskLevel;
use super::record::PredictionRecord;

// ============================================================================
// EXPORT FORMATS
// ============================================================================

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSONL (one JSON per line)
    Jsonl,
    /// CSV for spreadsheet analysis, same columns as the history table
    Csv,
    /// Pretty JSON array
    JsonArray,
}

// ============================================================================
// EXPORT FUNCTIONS
// ============================================================================

/// Export records to file, returns number of records written
pub fn export_history(
    records: &[PredictionRecord],
    destination: &Path,
    format: ExportFormat,
) -> std::io::Result<usize> {
    let mut file = std::fs::File::create(destination)?;

    match format {
        ExportFormat::Jsonl => {
            for record in records {
                writeln!(file, "{}", serde_json::to_string(record)?)?;
            }
        }
        ExportFormat::JsonArray => {
            let json = serde_json::to_string_pretty(records)?;
            file.write_all(json.as_bytes())?;
        }
        ExportFormat::Csv => {
            export_csv(&mut file, records)?;
        }
    }

    file.flush()?;
    log::info!("Exported {} prediction(s) to {:?}", records.len(), destination);
    Ok(records.len())
}

/// Export to CSV format
fn export_csv(file: &mut std::fs::File, records: &[PredictionRecord]) -> std::io::Result<()> {
    writeln!(
        file,
        "id,timestamp,gender,age,urea,cr,hba1c,chol,tg,hdl,ldl,vldl,bmi,prediction,risk,probability"
    )?;

    for r in records {
        let f = &r.features;
        // Labels come from the artifact; quote them
        let label = r.label.replace('"', "\"\"");

        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},\"{}\",{},{:.4}",
            r.id,
            r.timestamp,
            f.gender.as_str(),
            f.age,
            f.urea,
            f.cr,
            f.hba1c,
            f.chol,
            f.tg,
            f.hdl,
            f.ldl,
            f.vldl,
            f.bmi,
            label,
            r.risk.as_str(),
            r.probability
        )?;
    }

    Ok(())
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Risk distribution over a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub low_count: usize,
    pub moderate_count: usize,
    pub high_count: usize,
    pub avg_probability: f64,
}

/// Summarize records by risk level
pub fn summarize(records: &[PredictionRecord]) -> HistorySummary {
    let mut summary = HistorySummary { total: records.len(), ..Default::default() };

    for r in records {
        match r.risk {
            RiskLevel::Low => summary.low_count += 1,
            RiskLevel::Moderate => summary.moderate_count += 1,
            RiskLevel::High => summary.high_count += 1,
        }
        summary.avg_probability += r.probability;
    }

    if summary.total > 0 {
        summary.avg_probability /= summary.total as f64;
    }
    summary
}
