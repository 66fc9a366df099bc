use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;
use crate::logic::risk::RiskLevel;

/// `YYYY-MM-DD HH:MM:SS`, local time
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored prediction. Written once, never changed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// Assigned by the store, increasing
    pub id: i64,
    pub timestamp: String,

    // Inputs, denormalized
    pub features: FeatureVector,

    // Outcome
    pub label: String,
    pub risk: RiskLevel,
    pub probability: f64,
}

impl PredictionRecord {
    /// Parsed timestamp, if the stored text is well-formed
    pub fn recorded_at(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}
