//! Feature Scaler
//!
//! Linear per-column transform fitted by the trainer.
//! Zero-width columns are left unscaled (divide by 1), as the trainer does.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ModelInvocationError};
use crate::logic::features::layout::validate_feature_names;
use crate::logic::features::ScaledFeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
    /// `(x - data_min) / (data_max - data_min)`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
    },
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { data_min, .. } => data_min.len(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
        }
    }

    /// Internal consistency check, run once at load
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let (a, b, names) = match self {
            Scaler::Standard { mean, scale, feature_names } => (mean, scale, feature_names),
            Scaler::MinMax { data_min, data_max, feature_names } => (data_min, data_max, feature_names),
        };

        if a.is_empty() {
            return Err(ArtifactLoadError::invalid("scaler", "no columns"));
        }
        if a.len() != b.len() {
            return Err(ArtifactLoadError::invalid(
                "scaler",
                format!("parameter lengths differ ({} vs {})", a.len(), b.len()),
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactLoadError::invalid("scaler", "non-finite parameter"));
        }
        if let Some(names) = names {
            validate_feature_names(names)?;
        }
        Ok(())
    }

    /// Apply the fitted transform
    pub fn transform(&self, x: &[f64]) -> Result<ScaledFeatureVector, ModelInvocationError> {
        if x.len() != self.n_features() {
            return Err(ModelInvocationError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features(),
                actual: x.len(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale, .. } => x
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(v, (m, s))| (v - m) / non_zero(*s))
                .collect(),
            Scaler::MinMax { data_min, data_max, .. } => x
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(v, (lo, hi))| (v - lo) / non_zero(hi - lo))
                .collect(),
        };

        Ok(ScaledFeatureVector(scaled))
    }
}

fn non_zero(s: f64) -> f64 {
    if s == 0.0 { 1.0 } else { s }
}
