//! Diabetes Risk Core
//!
//! Validates a patient's lab results, runs a pre-trained classifier over
//! them and keeps a local history of every prediction.
//!
//! ```no_run
//! use diabetes_risk_core::{Config, Pipeline};
//!
//! # fn main() -> Result<(), diabetes_risk_core::PipelineError> {
//! diabetes_risk_core::init_logging();
//! let pipeline = Pipeline::open(&Config::from_env())?;
//! let history = pipeline.history()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{
    ArtifactLoadError, ErrorKind, ModelInvocationError, PersistenceError, PipelineError, PipelineResult,
    ValidationError,
};
pub use logic::config::Config;
pub use logic::features::{parse, FeatureVector, Sex};
pub use logic::journal::{PredictionLog, PredictionRecord, SqliteJournal};
pub use logic::model::{predict, ArtifactPaths, Artifacts, PredictionResult};
pub use logic::pipeline::{Pipeline, Submission};
pub use logic::risk::RiskLevel;

/// Install `env_logger` with `info` as the default filter.
/// `RUST_LOG` overrides it. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
