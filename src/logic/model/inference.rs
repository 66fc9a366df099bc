//! Prediction Engine
//!
//! scale → classify → probability of the predicted class → decode label.
//! Deterministic, no side effects.

use serde::{Deserialize, Serialize};

use crate::error::ModelInvocationError;
use crate::logic::features::FeatureVector;
use crate::logic::risk::RiskLevel;
use super::artifacts::Artifacts;

/// Slack allowed on probabilities before they count as invalid
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub risk: RiskLevel,
    /// Raw class label from the label encoder
    pub label: String,
    /// Classifier probability of the predicted class, 0.0 - 1.0
    pub probability: f64,
}

/// Run one prediction
pub fn predict(vector: &FeatureVector, artifacts: &Artifacts) -> Result<PredictionResult, ModelInvocationError> {
    let scaled = artifacts.scaler().transform(&vector.as_array())?;
    if scaled.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(ModelInvocationError::NonFiniteInput { stage: "scaler" });
    }
    let classifier = artifacts.classifier();

    if let Some(expected) = classifier.n_features() {
        if scaled.len() != expected {
            return Err(ModelInvocationError::ShapeMismatch {
                stage: "classifier",
                expected,
                actual: scaled.len(),
            });
        }
    }

    let index = classifier.predict(scaled.as_slice())?;
    let proba = classifier.predict_proba(scaled.as_slice())?;

    if proba.len() != classifier.n_classes() {
        return Err(ModelInvocationError::ShapeMismatch {
            stage: "predict_proba",
            expected: classifier.n_classes(),
            actual: proba.len(),
        });
    }

    // Probability of the predicted class, not the max of the distribution
    let probability = *proba.get(index).ok_or(ModelInvocationError::ClassIndexOutOfRange {
        index,
        n_classes: proba.len(),
    })?;

    if !probability.is_finite()
        || probability < -PROBABILITY_TOLERANCE
        || probability > 1.0 + PROBABILITY_TOLERANCE
    {
        return Err(ModelInvocationError::InvalidProbability(probability));
    }

    let label = artifacts.encoder().inverse_transform(index)?.to_string();
    let risk = artifacts.risk_for(index)?;

    log::debug!("Prediction: class={} label={} risk={} p={:.4}", index, label, risk, probability);

    Ok(PredictionResult {
        risk,
        label,
        probability: probability.clamp(0.0, 1.0),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{Sex, FEATURE_COUNT};
    use crate::logic::model::classifier::{Classifier, LogisticRegression};
    use crate::logic::model::encoder::LabelEncoder;
    use crate::logic::model::scaler::Scaler;

    fn vector(hba1c: f64) -> FeatureVector {
        FeatureVector {
            gender: Sex::Male,
            age: 35,
            urea: 4.5,
            cr: 60.0,
            hba1c,
            chol: 4.8,
            tg: 1.2,
            hdl: 1.3,
            ldl: 2.8,
            vldl: 0.6,
            bmi: 25.0,
        }
    }

    fn identity_scaler(n: usize) -> Scaler {
        Scaler::Standard { mean: vec![0.0; n], scale: vec![1.0; n], feature_names: None }
    }

    /// Class 2 scores on hba1c, class 0 is constant
    fn hba1c_model() -> LogisticRegression {
        let mut high = vec![0.0; FEATURE_COUNT];
        high[4] = 1.0;
        LogisticRegression {
            coef: vec![vec![0.0; FEATURE_COUNT], vec![0.0; FEATURE_COUNT], high],
            intercept: vec![6.0, 0.0, 0.0],
        }
    }

    /// Predicts a fixed class with a fixed distribution
    struct Fixed {
        class: usize,
        proba: Vec<f64>,
    }

    impl Classifier for Fixed {
        fn kind(&self) -> &'static str { "fixed" }
        fn n_classes(&self) -> usize { 3 }
        fn n_features(&self) -> Option<usize> { None }
        fn predict(&self, _: &[f64]) -> Result<usize, ModelInvocationError> { Ok(self.class) }
        fn predict_proba(&self, _: &[f64]) -> Result<Vec<f64>, ModelInvocationError> { Ok(self.proba.clone()) }
    }

    #[test]
    fn test_predict_decodes_label() {
        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            LabelEncoder::new(["N", "P", "Y"]),
            Box::new(hba1c_model()),
        )
        .unwrap();

        let low = predict(&vector(5.0), &artifacts).unwrap();
        assert_eq!(low.label, "N");
        assert_eq!(low.risk, RiskLevel::Low);

        let high = predict(&vector(9.5), &artifacts).unwrap();
        assert_eq!(high.label, "Y");
        assert_eq!(high.risk, RiskLevel::High);
        assert!(high.probability > 0.5 && high.probability <= 1.0);
    }

    #[test]
    fn test_overflowing_input_is_input_error() {
        let mut tiny = vec![1.0; FEATURE_COUNT];
        tiny[4] = 1e-310;
        let scaler = Scaler::Standard { mean: vec![0.0; FEATURE_COUNT], scale: tiny, feature_names: None };
        let artifacts = Artifacts::from_parts(scaler, LabelEncoder::new(["N", "P", "Y"]), Box::new(hba1c_model()))
            .unwrap();

        let err = predict(&vector(1.0e6), &artifacts).unwrap_err();
        assert_eq!(err, ModelInvocationError::NonFiniteInput { stage: "scaler" });
        assert!(err.is_input_error());
    }

    #[test]
    fn test_probability_is_for_predicted_class() {
        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            LabelEncoder::new(["N", "P", "Y"]),
            Box::new(Fixed { class: 1, proba: vec![0.6, 0.3, 0.1] }),
        )
        .unwrap();

        let result = predict(&vector(5.0), &artifacts).unwrap();
        assert_eq!(result.risk, RiskLevel::Moderate);
        assert_eq!(result.probability, 0.3);
    }

    #[test]
    fn test_deterministic() {
        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            LabelEncoder::new(["N", "P", "Y"]),
            Box::new(hba1c_model()),
        )
        .unwrap();

        let a = predict(&vector(6.1), &artifacts).unwrap();
        let b = predict(&vector(6.1), &artifacts).unwrap();
        assert_eq!(a.label, b.label);
        assert!((a.probability - b.probability).abs() < 1e-12);
    }

    #[test]
    fn test_scaler_shape_mismatch() {
        let artifacts = Artifacts::from_parts(
            identity_scaler(8),
            LabelEncoder::new(["N", "P", "Y"]),
            Box::new(hba1c_model()),
        )
        .unwrap();

        let err = predict(&vector(5.0), &artifacts).unwrap_err();
        assert!(matches!(err, ModelInvocationError::ShapeMismatch { stage: "scaler", .. }));
    }

    #[test]
    fn test_classifier_shape_mismatch() {
        let narrow = LogisticRegression {
            coef: vec![vec![0.0; 4], vec![0.0; 4], vec![0.0; 4]],
            intercept: vec![0.0; 3],
        };
        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            LabelEncoder::new(["N", "P", "Y"]),
            Box::new(narrow),
        )
        .unwrap();

        let err = predict(&vector(5.0), &artifacts).unwrap_err();
        assert!(matches!(err, ModelInvocationError::ShapeMismatch { stage: "classifier", .. }));
    }

    #[test]
    fn test_out_of_range_class_and_bad_probability() {
        let encoder = || LabelEncoder::new(["N", "P", "Y"]);

        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            encoder(),
            Box::new(Fixed { class: 7, proba: vec![0.2, 0.3, 0.5] }),
        )
        .unwrap();
        assert!(matches!(
            predict(&vector(5.0), &artifacts),
            Err(ModelInvocationError::ClassIndexOutOfRange { index: 7, .. })
        ));

        let artifacts = Artifacts::from_parts(
            identity_scaler(FEATURE_COUNT),
            encoder(),
            Box::new(Fixed { class: 0, proba: vec![f64::NAN, 0.3, 0.5] }),
        )
        .unwrap();
        assert!(matches!(
            predict(&vector(5.0), &artifacts),
            Err(ModelInvocationError::InvalidProbability(_))
        ));
    }
}
