//! Pipeline configuration

use std::path::PathBuf;

use crate::constants;
use crate::logic::model::ArtifactPaths;

/// Where the pipeline finds its artifacts and keeps its history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory with scaler / label encoder / classifier files
    pub artifact_dir: PathBuf,

    /// SQLite file for the prediction history
    pub database_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            artifact_dir: constants::get_artifact_dir(),
            database_path: constants::get_database_path(),
        }
    }

    pub fn new(artifact_dir: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            database_path: database_path.into(),
        }
    }

    /// Artifact file locations derived from `artifact_dir`
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifact_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(constants::DEFAULT_ARTIFACT_DIR),
            database_path: constants::default_database_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_follow_dir() {
        let config = Config::new("/opt/models", "/tmp/history.db");
        let paths = config.artifact_paths();
        assert_eq!(paths.scaler, PathBuf::from("/opt/models").join(constants::SCALER_FILE));
        assert_eq!(paths.encoder, PathBuf::from("/opt/models").join(constants::ENCODER_FILE));
    }

    #[test]
    fn test_default_db_file_name() {
        let config = Config::default();
        assert!(config.database_path.ends_with(constants::DEFAULT_DB_FILE));
    }
}
