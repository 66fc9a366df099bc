//! Feature Vector - Core data structure for model input
//!
//! Typed, validated patient measurements in layout order.
//! Built only by `parse`, so every field is present and numeric.

use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

// ============================================================================
// SEX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Model encoding: female = 0, male = 1
    pub fn code(&self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    /// Form text: `male` / `female`, case-insensitive
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("male") {
            Some(Sex::Male)
        } else if s.eq_ignore_ascii_case("female") {
            Some(Sex::Female)
        } else {
            None
        }
    }

    /// Stored text. Also accepts the labels written by older builds.
    pub fn from_stored_label(s: &str) -> Option<Self> {
        match s.trim() {
            "МУЖСКОЙ" => Some(Sex::Male),
            "ЖЕНСКИЙ" => Some(Sex::Female),
            other => Self::from_label(other),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Patient measurements in the order defined by `FEATURE_LAYOUT`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub gender: Sex,
    pub age: u32,
    pub urea: f64,
    pub cr: f64,
    pub hba1c: f64,
    pub chol: f64,
    pub tg: f64,
    pub hdl: f64,
    pub ldl: f64,
    pub vldl: f64,
    pub bmi: f64,
}

impl FeatureVector {
    /// Numeric form fed to the scaler
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.gender.code() as f64,
            self.age as f64,
            self.urea,
            self.cr,
            self.hba1c,
            self.chol,
            self.tg,
            self.hdl,
            self.ldl,
            self.vldl,
            self.bmi,
        ]
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.as_array()[i])
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Named values, for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let values = self.as_array();
        let named: serde_json::Map<String, serde_json::Value> = FEATURE_LAYOUT
            .iter()
            .zip(values.iter())
            .map(|(name, v)| (name.to_string(), serde_json::json!(v)))
            .collect();
        serde_json::Value::Object(named)
    }
}

// ============================================================================
// SCALED FEATURE VECTOR
// ============================================================================

/// Output of the scaler. Same order as the input; values only mean
/// something to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledFeatureVector(pub Vec<f64>);

impl ScaledFeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
