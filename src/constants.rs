//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden from the environment.

use std::path::PathBuf;

/// Default directory holding the trained artifacts
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Default SQLite file name for the prediction history
pub const DEFAULT_DB_FILE: &str = "diabetes_predictions.db";

/// Directory name under the platform data dir
pub const APP_DATA_DIR: &str = "diabetes-risk";

/// Environment variable overriding the artifact directory
pub const ENV_ARTIFACT_DIR: &str = "DIABETES_ARTIFACT_DIR";

/// Environment variable overriding the database path
pub const ENV_DB_PATH: &str = "DIABETES_DB_PATH";

/// Artifact file names inside the artifact directory
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODER_FILE: &str = "label_encoder.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const ONNX_CLASSIFIER_FILE: &str = "classifier.onnx";
pub const MANIFEST_FILE: &str = "manifest.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Diabetes Risk";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get artifact directory from environment or use default
pub fn get_artifact_dir() -> PathBuf {
    std::env::var(ENV_ARTIFACT_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_DIR))
}

/// Get database path from environment or use the platform data dir
pub fn get_database_path() -> PathBuf {
    std::env::var(ENV_DB_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

/// `<data_local_dir>/diabetes-risk/diabetes_predictions.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DATA_DIR)
        .join(DEFAULT_DB_FILE)
}
