//! Artifact Store
//!
//! Loads scaler, label encoder and classifier once at startup.
//! All three load and validate, or nothing does.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants;
use crate::error::{ArtifactLoadError, ModelInvocationError};
use crate::logic::features::layout::validate_layout;
use crate::logic::risk::RiskLevel;
use super::classifier::{Classifier, ClassifierFile};
use super::encoder::LabelEncoder;
use super::scaler::Scaler;

// ============================================================================
// PATHS
// ============================================================================

/// Locations of the artifact files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub encoder: PathBuf,
    pub classifier: PathBuf,
    /// Optional; skipped when the file does not exist
    pub manifest: PathBuf,
}

impl ArtifactPaths {
    /// Fixed file layout inside one directory.
    ///
    /// With the `onnx` feature, `classifier.onnx` is preferred when present.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();

        let json_classifier = dir.join(constants::CLASSIFIER_FILE);
        let classifier = if cfg!(feature = "onnx") && dir.join(constants::ONNX_CLASSIFIER_FILE).exists() {
            dir.join(constants::ONNX_CLASSIFIER_FILE)
        } else {
            json_classifier
        };

        Self {
            scaler: dir.join(constants::SCALER_FILE),
            encoder: dir.join(constants::ENCODER_FILE),
            classifier,
            manifest: dir.join(constants::MANIFEST_FILE),
        }
    }
}

// ============================================================================
// MANIFEST
// ============================================================================

/// Optional provenance file written by the trainer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    /// File name (relative to the manifest) → lowercase hex SHA-256
    #[serde(default)]
    pub sha256: HashMap<String, String>,
}

impl Manifest {
    /// Check declared layout and every listed checksum
    pub fn verify(&self, base_dir: &Path) -> Result<(), ArtifactLoadError> {
        validate_layout(self.feature_version, self.layout_hash)?;

        for (name, expected) in &self.sha256 {
            let path = base_dir.join(name);
            let actual = compute_file_hash(&path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ArtifactLoadError::ChecksumMismatch {
                    path,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Compute SHA256 hash of file
pub fn compute_file_hash(path: &Path) -> Result<String, ArtifactLoadError> {
    if !path.exists() {
        return Err(ArtifactLoadError::Missing(path.to_path_buf()));
    }
    let io_err = |source| ArtifactLoadError::Io { path: path.to_path_buf(), source };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(hex::encode(hasher.finalize()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    if !path.exists() {
        return Err(ArtifactLoadError::Missing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|source| ArtifactLoadError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| ArtifactLoadError::Parse { path: path.to_path_buf(), source })
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Loaded, validated model artifacts. Immutable after construction.
pub struct Artifacts {
    scaler: Scaler,
    encoder: LabelEncoder,
    classifier: Box<dyn Classifier>,
    risk_levels: Vec<RiskLevel>,
    manifest: Option<Manifest>,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("scaler", &self.scaler.kind())
            .field("classes", &self.encoder.classes)
            .field("classifier", &self.classifier.kind())
            .field("source", &self.source)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl Artifacts {
    /// Load all artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        log::info!("Loading artifacts: classifier={}", paths.classifier.display());

        let manifest = if paths.manifest.exists() {
            let manifest: Manifest = read_json(&paths.manifest)?;
            let base_dir = paths.manifest.parent().unwrap_or_else(|| Path::new("."));
            manifest.verify(base_dir)?;
            Some(manifest)
        } else {
            None
        };

        let scaler: Scaler = read_json(&paths.scaler)?;
        let encoder: LabelEncoder = read_json(&paths.encoder)?;
        let classifier = load_classifier(&paths.classifier, encoder.n_classes())?;

        let source = paths
            .classifier
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let artifacts = Self::assemble(scaler, encoder, classifier, manifest, source)?;
        log::info!(
            "Artifacts ready: scaler={}, classifier={}, classes={:?}",
            artifacts.scaler.kind(),
            artifacts.classifier.kind(),
            artifacts.encoder.classes
        );
        Ok(artifacts)
    }

    /// Build from in-memory parts (same validation as `load`)
    pub fn from_parts(
        scaler: Scaler,
        encoder: LabelEncoder,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactLoadError> {
        Self::assemble(scaler, encoder, classifier, None, "<memory>".to_string())
    }

    fn assemble(
        scaler: Scaler,
        encoder: LabelEncoder,
        classifier: Box<dyn Classifier>,
        manifest: Option<Manifest>,
        source: String,
    ) -> Result<Self, ArtifactLoadError> {
        scaler.validate()?;
        let risk_levels = encoder.risk_levels()?;

        if classifier.n_classes() != encoder.n_classes() {
            return Err(ArtifactLoadError::invalid(
                "classifier",
                format!(
                    "classifier has {} classes, label encoder has {}",
                    classifier.n_classes(),
                    encoder.n_classes()
                ),
            ));
        }

        Ok(Self {
            scaler,
            encoder,
            classifier,
            risk_levels,
            manifest,
            source,
            loaded_at: Utc::now(),
        })
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Manifest model name, or the directory the artifacts came from
    pub fn model_name(&self) -> String {
        self.manifest
            .as_ref()
            .and_then(|m| m.model_name.clone())
            .unwrap_or_else(|| self.source.clone())
    }

    /// Risk level for a class index (validated at load)
    pub fn risk_for(&self, index: usize) -> Result<RiskLevel, ModelInvocationError> {
        self.risk_levels
            .get(index)
            .copied()
            .ok_or(ModelInvocationError::ClassIndexOutOfRange {
                index,
                n_classes: self.risk_levels.len(),
            })
    }
}

fn load_classifier(path: &Path, n_classes: usize) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
    #[cfg(feature = "onnx")]
    {
        if path.extension().map_or(false, |e| e == "onnx") {
            return Ok(Box::new(super::onnx::OnnxClassifier::load(path, n_classes)?));
        }
    }
    #[cfg(not(feature = "onnx"))]
    let _ = n_classes;

    let file: ClassifierFile = read_json(path)?;
    file.build()
}

// ============================================================================
// TESTS
// ============================================================================
