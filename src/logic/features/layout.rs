//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema shared with the trained artifacts.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The scaler and classifier were fitted on columns in exactly this order.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector.
/// Also the form field keys and the history table column names.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Demographics (0-1) ===
    "gender",  // 0: 0 = female, 1 = male
    "age",     // 1: years

    // === Kidney function (2-3) ===
    "urea",    // 2: mmol/L
    "cr",      // 3: creatinine, µmol/L

    // === Glycemic control (4) ===
    "hba1c",   // 4: %

    // === Lipid panel (5-9) ===
    "chol",    // 5: total cholesterol, mmol/L
    "tg",      // 6: triglycerides, mmol/L
    "hdl",     // 7: mmol/L
    "ldl",     // 8: mmol/L
    "vldl",    // 9: mmol/L

    // === Body (10) ===
    "bmi",     // 10: kg/m²
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 11;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches when artifacts are loaded
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Validate that artifacts were built for the current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), ArtifactLoadError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(ArtifactLoadError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Validate a list of column names against the layout
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), ArtifactLoadError> {
    let matches = names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_LAYOUT)
            .all(|(n, expected)| n.as_ref().eq_ignore_ascii_case(expected));

    if matches {
        Ok(())
    } else {
        let got: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        Err(ArtifactLoadError::invalid(
            "scaler",
            format!("feature_names {:?} do not match layout {:?}", got, FEATURE_LAYOUT),
        ))
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
