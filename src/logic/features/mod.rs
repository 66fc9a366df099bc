//! Features Module - Form Input → Model Input
//!
//! Layout contract, typed feature vector, and the input validator.

pub mod layout;
pub mod vector;
pub mod parse;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo};
pub use vector::{FeatureVector, ScaledFeatureVector, Sex};
pub use parse::parse;
