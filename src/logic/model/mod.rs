//! Model Module - Artifact Store & Prediction Engine
//!
//! Artifact loading is kept apart from inference.
//! Classifier backends sit behind the `Classifier` trait.

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod inference;
pub mod scaler;
#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use artifacts::{Artifacts, ArtifactPaths, Manifest};
pub use classifier::{Classifier, ClassifierFile, LogisticRegression, RandomForest};
pub use encoder::LabelEncoder;
pub use inference::{predict, PredictionResult};
pub use scaler::Scaler;
