//! Classifiers
//!
//! `Classifier` is the seam between the prediction engine and whatever
//! backend produced the model. JSON-exported linear and tree-ensemble
//! models are evaluated natively; ONNX graphs live in `onnx.rs`.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ModelInvocationError};

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for classifier backends (JSON models, ONNX, ...)
pub trait Classifier: Send + Sync {
    /// Short backend name for status reporting
    fn kind(&self) -> &'static str;

    fn n_classes(&self) -> usize;

    /// Expected input width, when the backend knows it up front
    fn n_features(&self) -> Option<usize>;

    /// Predicted class index
    fn predict(&self, x: &[f64]) -> Result<usize, ModelInvocationError>;

    /// Probability for every class, index-aligned with the encoder
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelInvocationError>;
}

fn check_width(expected: usize, x: &[f64]) -> Result<(), ModelInvocationError> {
    if x.len() != expected {
        return Err(ModelInvocationError::ShapeMismatch {
            stage: "classifier",
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

/// First index of the largest value
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ============================================================================
// SERIALIZED FORM
// ============================================================================

/// `classifier.json` document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierFile {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierFile {
    /// Validate and turn into a runnable classifier
    pub fn build(self) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
        match self {
            ClassifierFile::LogisticRegression(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ClassifierFile::RandomForest(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Linear model. One coefficient row per class (softmax), or a single row
/// for the binary case (sigmoid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let width = self.coef.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(ArtifactLoadError::invalid("classifier", "empty coefficient matrix"));
        }
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(ArtifactLoadError::invalid("classifier", "ragged coefficient matrix"));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ArtifactLoadError::invalid(
                "classifier",
                format!("{} intercepts for {} coefficient rows", self.intercept.len(), self.coef.len()),
            ));
        }
        if self.coef.iter().flatten().chain(&self.intercept).any(|v| !v.is_finite()) {
            return Err(ArtifactLoadError::invalid("classifier", "non-finite coefficient"));
        }
        Ok(())
    }

    fn decision_function(&self, x: &[f64]) -> Result<Vec<f64>, ModelInvocationError> {
        check_width(self.n_features().unwrap_or(0), x)?;
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>())
            .collect();

        // inf - inf in the softmax would turn into NaN
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ModelInvocationError::NonFiniteInput { stage: "classifier" });
        }
        Ok(scores)
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_classes(&self) -> usize {
        if self.coef.len() == 1 { 2 } else { self.coef.len() }
    }

    fn n_features(&self) -> Option<usize> {
        self.coef.first().map(Vec::len)
    }

    fn predict(&self, x: &[f64]) -> Result<usize, ModelInvocationError> {
        let scores = self.decision_function(x)?;
        if scores.len() == 1 {
            return Ok(if scores[0] > 0.0 { 1 } else { 0 });
        }
        Ok(argmax(&scores))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelInvocationError> {
        let scores = self.decision_function(x)?;

        if scores.len() == 1 {
            let p = 1.0 / (1.0 + (-scores[0]).exp());
            return Ok(vec![1.0 - p, p]);
        }

        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|e| e / sum).collect())
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

/// Tree node in pre-order array form. Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights (counts or fractions)
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn leaf(&self, x: &[f64]) -> Result<&[f64], ModelInvocationError> {
        let mut i = 0;
        // A valid path visits each node at most once
        for _ in 0..self.nodes.len() {
            match self.nodes.get(i) {
                Some(Node::Leaf { value }) => return Ok(value),
                Some(Node::Split { feature, threshold, left, right }) => {
                    let v = x.get(*feature).ok_or_else(|| {
                        ModelInvocationError::Backend(format!("split on missing feature {}", feature))
                    })?;
                    i = if *v <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(ModelInvocationError::Backend(format!("tree walk left the node array at {}", i)))
    }
}

/// Averaged tree ensemble. A one-tree forest is a plain decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.trees.is_empty() || self.n_classes == 0 || self.n_features == 0 {
            return Err(ArtifactLoadError::invalid("classifier", "empty forest"));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ArtifactLoadError::invalid("classifier", format!("tree {} has no nodes", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                let ok = match node {
                    Node::Split { feature, threshold, left, right } => {
                        *feature < self.n_features
                            && threshold.is_finite()
                            && *left > i
                            && *right > i
                            && *left < tree.nodes.len()
                            && *right < tree.nodes.len()
                    }
                    Node::Leaf { value } => {
                        value.len() == self.n_classes
                            && value.iter().all(|v| v.is_finite() && *v >= 0.0)
                            && value.iter().sum::<f64>() > 0.0
                    }
                };
                if !ok {
                    return Err(ArtifactLoadError::invalid(
                        "classifier",
                        format!("tree {} node {} is malformed", t, i),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        if self.trees.len() == 1 { "decision_tree" } else { "random_forest" }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn predict(&self, x: &[f64]) -> Result<usize, ModelInvocationError> {
        Ok(argmax(&self.predict_proba(x)?))
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelInvocationError> {
        check_width(self.n_features, x)?;

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.leaf(x)?;
            let total: f64 = leaf.iter().sum();
            for (p, v) in proba.iter_mut().zip(leaf) {
                *p += v / total;
            }
        }

        let n = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
