//! Label Encoder
//!
//! Class index ↔ raw label, plus the startup check that the labels cover
//! exactly the three risk levels.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ModelInvocationError};
use crate::logic::risk::RiskLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Class labels in index order
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self { classes: classes.into_iter().map(Into::into).collect() }
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Decode a class index to its raw label
    pub fn inverse_transform(&self, index: usize) -> Result<&str, ModelInvocationError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ModelInvocationError::ClassIndexOutOfRange {
                index,
                n_classes: self.classes.len(),
            })
    }

    /// Map every class to a risk level, index-aligned.
    ///
    /// Fails unless the classes map one-to-one onto {Low, Moderate, High}.
    pub fn risk_levels(&self) -> Result<Vec<RiskLevel>, ArtifactLoadError> {
        let mut levels = Vec::with_capacity(self.classes.len());

        for class in &self.classes {
            let level = RiskLevel::from_raw_label(class).ok_or_else(|| {
                ArtifactLoadError::invalid("label_encoder", format!("unknown class `{}`", class))
            })?;
            if levels.contains(&level) {
                return Err(ArtifactLoadError::invalid(
                    "label_encoder",
                    format!("class `{}` duplicates risk level {}", class, level),
                ));
            }
            levels.push(level);
        }

        let covers_all = RiskLevel::ALL.iter().all(|l| levels.contains(l));
        if !covers_all || levels.len() != RiskLevel::ALL.len() {
            return Err(ArtifactLoadError::invalid(
                "label_encoder",
                format!("classes {:?} do not cover low/moderate/high", self.classes),
            ));
        }

        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_transform() {
        let encoder = LabelEncoder::new(["N", "P", "Y"]);
        assert_eq!(encoder.inverse_transform(2).unwrap(), "Y");
        assert!(matches!(
            encoder.inverse_transform(3),
            Err(ModelInvocationError::ClassIndexOutOfRange { index: 3, n_classes: 3 })
        ));
    }

    #[test]
    fn test_risk_levels_follow_class_order() {
        let encoder = LabelEncoder::new(["Y", "N", "P"]);
        assert_eq!(
            encoder.risk_levels().unwrap(),
            vec![RiskLevel::High, RiskLevel::Low, RiskLevel::Moderate]
        );
    }

    #[test]
    fn test_risk_levels_reject_incomplete_set() {
        assert!(LabelEncoder::new(["N", "Y"]).risk_levels().is_err());
        assert!(LabelEncoder::new(["N", "P", "Y", "X"]).risk_levels().is_err());
        assert!(LabelEncoder::new(["N", "low", "Y"]).risk_levels().is_err());
    }
}
