//! Risk Levels
//!
//! Closed set of outcomes the classifier can produce.
//! Raw label strings are mapped once, here; nothing else branches on them.

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Diabetes risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Non-diabetic profile
    Low,
    /// Pre-diabetic / borderline profile
    Moderate,
    /// Diabetic profile
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High];

    /// Map an artifact class label.
    ///
    /// The reference encoder uses the dataset's class codes
    /// `N` (non-diabetic), `P` (pre-diabetic), `Y` (diabetic).
    pub fn from_raw_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "n" | "low" => Some(RiskLevel::Low),
            "p" | "moderate" => Some(RiskLevel::Moderate),
            "y" | "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    /// Lenient mapping for labels already in the history table.
    /// Anything unrecognised is shown as moderate.
    pub fn from_stored_label(label: &str) -> Self {
        Self::from_raw_label(label).unwrap_or(RiskLevel::Moderate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Moderate => 1,
            RiskLevel::High => 2,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Moderate => "Moderate risk",
            RiskLevel::High => "High risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Values are within normal range. Standard monitoring is recommended.",
            RiskLevel::Moderate => "Deviations detected. Lifestyle correction and additional tests are recommended.",
            RiskLevel::High => "Anomaly detected. Consult a physician as soon as possible.",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_codes() {
        assert_eq!(RiskLevel::from_raw_label("N"), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_raw_label("P"), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::from_raw_label("Y "), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_raw_label("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_raw_label("maybe"), None);
    }

    #[test]
    fn test_stored_label_fallback() {
        assert_eq!(RiskLevel::from_stored_label("N"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_stored_label("???"), RiskLevel::Moderate);
    }

    #[test]
    fn test_severity_order() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert_eq!(RiskLevel::High.severity_level(), 2);
    }
}
