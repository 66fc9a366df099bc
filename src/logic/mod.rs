//! Logic Module - Prediction Core
//!
//! ## Structure
//! - `features/` - Feature layout, FeatureVector, input validation
//! - `model/` - Artifacts, classifiers, prediction engine
//! - `journal/` - Prediction history (SQLite), export
//! - `risk.rs` - Closed set of risk levels
//! - `pipeline.rs` - Context object tying the above together
//! - `config.rs` - Artifact / database locations

pub mod config;
pub mod features;
pub mod journal;
pub mod model;
pub mod pipeline;
pub mod risk;
