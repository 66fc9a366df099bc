use super::*;
use crate::logic::features::{FeatureVector, Sex};
use crate::logic::model::PredictionResult;
use crate::logic::risk::RiskLevel;

use tempfile::TempDir;

fn sample_vector(age: u32) -> FeatureVector {
    FeatureVector {
        gender: Sex::Male,
        age,
        urea: 4.7,
        cr: 46.0,
        hba1c: 4.9,
        chol: 4.2,
        tg: 0.9,
        hdl: 2.4,
        ldl: 1.4,
        vldl: 0.5,
        bmi: 24.0,
    }
}

fn result(label: &str, risk: RiskLevel, probability: f64) -> PredictionResult {
    PredictionResult { risk, label: label.to_string(), probability }
}

#[test]
fn test_record_then_history_roundtrip() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    let vector = sample_vector(50);

    let before = chrono::Local::now().naive_local();
    let stored = journal.record(&vector, &result("N", RiskLevel::Low, 0.87)).unwrap();

    let history = journal.history().unwrap();
    assert_eq!(history.len(), 1);

    let row = &history[0];
    assert_eq!(row.id, stored.id);
    assert_eq!(row.features, vector);
    assert_eq!(row.label, "N");
    assert_eq!(row.risk, RiskLevel::Low);
    assert!((row.probability - 0.87).abs() < 1e-12);

    let at = row.recorded_at().expect("timestamp format");
    let drift = (at - before).num_seconds().abs();
    assert!(drift <= 2, "timestamp drifted {}s", drift);
}

#[test]
fn test_history_newest_first() {
    let journal = SqliteJournal::open_in_memory().unwrap();

    let mut ids = Vec::new();
    for age in 1..=5 {
        let rec = journal.record(&sample_vector(age), &result("P", RiskLevel::Moderate, 0.5)).unwrap();
        ids.push(rec.id);
    }

    // ids increase with insertion order
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let history = journal.history().unwrap();
    let returned: Vec<i64> = history.iter().map(|r| r.id).collect();
    ids.reverse();
    assert_eq!(returned, ids);
    assert_eq!(history[0].features.age, 5);
    assert_eq!(journal.count().unwrap(), 5);
}

#[test]
fn test_empty_history() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    assert!(journal.history().unwrap().is_empty());
    assert_eq!(journal.count().unwrap(), 0);
}

#[test]
fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("history.db");

    {
        let journal = SqliteJournal::open(&path).unwrap();
        journal.record(&sample_vector(33), &result("Y", RiskLevel::High, 0.91)).unwrap();
        assert_eq!(journal.path(), Some(path.as_path()));
    }

    let reopened = SqliteJournal::open(&path).unwrap();
    let history = reopened.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].risk, RiskLevel::High);
    assert_eq!(history[0].features.age, 33);
}

#[test]
fn test_failed_write_leaves_no_row() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    journal.record(&sample_vector(40), &result("N", RiskLevel::Low, 0.7)).unwrap();

    journal.set_query_only(true).unwrap();
    let err = journal.record(&sample_vector(41), &result("Y", RiskLevel::High, 0.8));
    assert!(matches!(err, Err(PersistenceError::Sqlite(_))));

    journal.set_query_only(false).unwrap();
    let history = journal.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].features.age, 40);
}

#[test]
fn test_legacy_rows_readable() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    journal
        .execute_raw(
            "INSERT INTO predictions (timestamp, gender, age, urea, cr, hba1c, chol, tg, hdl, ldl, vldl, bmi, prediction, probability)
             VALUES ('2024-03-01 10:00:00', 'ЖЕНСКИЙ', 57.0, 5.0, 60.0, 7.1, 5.0, 2.1, 1.0, 2.9, 0.9, 31.0, 'Y', 0.93)",
        )
        .unwrap();

    let history = journal.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].features.gender, Sex::Female);
    assert_eq!(history[0].features.age, 57);
    assert_eq!(history[0].risk, RiskLevel::High);
}

#[test]
fn test_unreadable_row_skipped() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    journal.record(&sample_vector(44), &result("N", RiskLevel::Low, 0.66)).unwrap();
    journal
        .execute_raw(
            "INSERT INTO predictions (timestamp, gender, age, urea, cr, hba1c, chol, tg, hdl, ldl, vldl, bmi, prediction, probability)
             VALUES ('2024-03-01 10:00:00', 'unknown', 57, 5.0, 60.0, 7.1, 5.0, 2.1, 1.0, 2.9, 0.9, 31.0, 'Y', 0.93)",
        )
        .unwrap();

    let history = journal.history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].features.age, 44);
}

#[test]
fn test_concurrent_records_keep_ids_unique() {
    const WORKERS: u32 = 8;
    const PER_WORKER: u32 = 5;

    let journal = SqliteJournal::open_in_memory().unwrap();

    let mut ids: Vec<(i64, u32)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|w| {
                let journal = &journal;
                scope.spawn(move || {
                    let mut mine = Vec::new();
                    let mut last = 0;
                    for i in 0..PER_WORKER {
                        let age = 1 + w * PER_WORKER + i;
                        let rec = journal.record(&sample_vector(age), &result("P", RiskLevel::Moderate, 0.5)).unwrap();
                        // Ids seen by one thread only grow
                        assert!(rec.id > last);
                        last = rec.id;
                        mine.push((rec.id, age));
                    }
                    mine
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let total = (WORKERS * PER_WORKER) as usize;
    ids.sort();
    ids.dedup_by_key(|(id, _)| *id);
    assert_eq!(ids.len(), total);
    assert_eq!(journal.count().unwrap(), total);

    // Every stored row is exactly what its writer sent
    let history = journal.history().unwrap();
    assert_eq!(history.len(), total);
    for row in &history {
        let (_, age) = ids.iter().find(|(id, _)| *id == row.id).copied().unwrap();
        assert_eq!(row.features, sample_vector(age));
        assert_eq!(row.label, "P");
        assert_eq!(row.risk, RiskLevel::Moderate);
        assert_eq!(row.probability, 0.5);
    }
}

#[test]
fn test_export_csv_and_summary() {
    let journal = SqliteJournal::open_in_memory().unwrap();
    journal.record(&sample_vector(30), &result("N", RiskLevel::Low, 0.6)).unwrap();
    journal.record(&sample_vector(60), &result("Y", RiskLevel::High, 0.8)).unwrap();
    let records = journal.history().unwrap();

    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("history.csv");
    let written = export_history(&records, &csv, ExportFormat::Csv).unwrap();
    assert_eq!(written, 2);

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,timestamp,gender,age"));
    assert!(lines[1].contains("\"Y\",high,0.8000"));

    let jsonl = dir.path().join("history.jsonl");
    export_history(&records, &jsonl, ExportFormat::Jsonl).unwrap();
    let parsed: Vec<PredictionRecord> = std::fs::read_to_string(&jsonl)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(parsed, records);

    let summary = summarize(&records);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.low_count, 1);
    assert_eq!(summary.high_count, 1);
    assert!((summary.avg_probability - 0.7).abs() < 1e-9);
}
