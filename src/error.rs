//! Error handling
//!
//! One error type per pipeline stage, plus `PipelineError` for callers that
//! drive the whole flow. Front ends decide what to show from `kind()` and
//! `user_message()`; the detailed `Display` text is for logs.

use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

// ============================================================================
// ARTIFACT LOADING (fatal, startup only)
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },

    #[error(
        "feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), \
         artifacts declare v{actual_version} ({actual_hash:08x})"
    )]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("onnx runtime error: {0}")]
    Onnx(String),
}

impl ArtifactLoadError {
    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ArtifactLoadError::Invalid { artifact, reason: reason.into() }
    }
}

// ============================================================================
// INPUT VALIDATION (recoverable)
// ============================================================================

/// Raw form input was missing or malformed.
///
/// `field` is kept for logs only; callers show the generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input data: field `{field}` {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

// ============================================================================
// MODEL INVOCATION (fatal per call)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelInvocationError {
    #[error("{stage} expects {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("class index {index} out of range for {n_classes} classes")]
    ClassIndexOutOfRange { index: usize, n_classes: usize },

    #[error("classifier returned invalid probability {0}")]
    InvalidProbability(f64),

    #[error("label `{0}` does not map to a risk level")]
    UnknownLabel(String),

    #[error("inference backend failed: {0}")]
    Backend(String),

    /// Input finite at parse time but overflowed after scaling / scoring
    #[error("input produced non-finite values at {stage}")]
    NonFiniteInput { stage: &'static str },
}

impl ModelInvocationError {
    /// Caused by the submitted values rather than the artifacts
    pub fn is_input_error(&self) -> bool {
        matches!(self, ModelInvocationError::NonFiniteInput { .. })
    }
}

// ============================================================================
// PERSISTENCE (recoverable, isolated)
// ============================================================================

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

// ============================================================================
// PIPELINE
// ============================================================================

/// How a front end should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Artifacts unusable; no predictions this session
    ArtifactLoad,
    /// Bad form data; re-prompt the user
    Validation,
    /// Artifact/input contract violation; system fault
    ModelInvocation,
    /// History write/read failed; prediction itself still valid
    Persistence,
    /// Pipeline halted by an earlier model fault
    Faulted,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ModelInvocation(#[from] ModelInvocationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("prediction disabled after model fault: {0}")]
    Faulted(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ArtifactLoad(_) => ErrorKind::ArtifactLoad,
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::ModelInvocation(_) => ErrorKind::ModelInvocation,
            PipelineError::Persistence(_) => ErrorKind::Persistence,
            PipelineError::Faulted(_) => ErrorKind::Faulted,
        }
    }

    /// Whether the user can fix this by retrying with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Persistence)
    }

    /// Message safe to show to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::ArtifactLoad(e) => {
                log::error!("Artifact load error: {}", e);
                "Model files could not be loaded. Predictions are unavailable."
            }
            PipelineError::Validation(_) => "Invalid input data. Please check the values and try again.",
            PipelineError::ModelInvocation(e) => {
                log::error!("Model invocation error: {}", e);
                "System fault: the model could not process this input."
            }
            PipelineError::Persistence(e) => {
                log::warn!("Persistence error: {}", e);
                "The prediction could not be saved to history."
            }
            PipelineError::Faulted(_) => "Predictions are disabled until the model is reloaded.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let validation: PipelineError = ValidationError::new("age", "is empty").into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(validation.is_recoverable());

        let model: PipelineError = ModelInvocationError::InvalidProbability(1.5).into();
        assert_eq!(model.kind(), ErrorKind::ModelInvocation);
        assert!(!model.is_recoverable());

        let faulted = PipelineError::Faulted("boom".to_string());
        assert!(!faulted.is_recoverable());
    }

    #[test]
    fn test_validation_message_is_generic() {
        let err: PipelineError = ValidationError::new("bmi", "is not a number").into();
        assert!(!err.user_message().contains("bmi"));
        assert!(err.to_string().contains("bmi"));
    }
}
