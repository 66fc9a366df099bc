use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub model: ModelStatus,
    pub journal: JournalStatus,
    pub runtime: RuntimeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub engine: String, // "logistic_regression" | "random_forest" | "decision_tree" | "onnx"
    pub scaler: String,
    pub model_name: String,
    pub model_version: Option<String>,
    pub classes: Vec<String>,
    pub loaded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalStatus {
    /// None when the store could not be read
    pub records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub predictions_made: u64,
    pub avg_latency_ms: f64,
    pub faulted: bool,
    pub fault_reason: Option<String>,
}
