//! Model Artifacts
//!
//! The scalers and classifier are pre-fitted elsewhere and shipped as JSON
//! files. The request pipeline only ever sees them through two narrow
//! capabilities:
//! - `Transform`: batch in, batch out (scalers)
//! - `Predict`: batch in, one class code per row out (classifier)
//!
//! Loading happens once at startup. Any failure here is fatal.

pub mod classifier;
pub mod scalers;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ArtifactError, InferenceError, TransformError};
use crate::features::N_FEATURES;
use crate::labels::ClassCode;

pub use classifier::Classifier;
pub use scalers::{MinMaxScaler, StandardScaler};

/// Fixed artifact file names inside the artifact directory
pub const CLASSIFIER_FILE: &str = "crop_recommendation.json";
pub const STANDARD_SCALER_FILE: &str = "standardscaler.json";
pub const MIN_MAX_SCALER_FILE: &str = "minmaxscaler.json";

/// Feature-wise transform over a batch of samples
pub trait Transform: Send + Sync {
    fn transform(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, TransformError>;

    /// Input width the transform was fitted on, if it knows
    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Class prediction over a batch of samples
pub trait Predict: Send + Sync {
    fn predict(&self, samples: &[Vec<f64>]) -> Result<Vec<ClassCode>, InferenceError>;

    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Short model family name, reported by the health endpoint
    fn kind(&self) -> &'static str {
        "custom"
    }
}

/// A JSON-encoded artifact that can check its own parameters after decoding
pub trait Artifact: DeserializeOwned {
    /// Human-readable name used in startup errors
    const NAME: &'static str;

    fn validate(&self) -> Result<(), String>;
}

/// Read, decode and validate one artifact file
pub fn load_artifact<T: Artifact>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        artifact: T::NAME,
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: T = serde_json::from_str(&contents).map_err(|source| ArtifactError::Decode {
        artifact: T::NAME,
        path: path.to_path_buf(),
        source,
    })?;

    artifact.validate().map_err(|reason| ArtifactError::Invalid {
        artifact: T::NAME,
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(artifact)
}

/// Locations of the three artifact files
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub standard_scaler: PathBuf,
    pub min_max_scaler: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            classifier: dir.join(CLASSIFIER_FILE),
            standard_scaler: dir.join(STANDARD_SCALER_FILE),
            min_max_scaler: dir.join(MIN_MAX_SCALER_FILE),
        }
    }
}

/// The loaded, immutable artifacts shared by every request
#[derive(Clone)]
pub struct ArtifactSet {
    pub min_max: Arc<dyn Transform>,
    pub standard: Arc<dyn Transform>,
    pub classifier: Arc<dyn Predict>,
}

impl ArtifactSet {
    /// Load all three artifacts from the standard file names under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Self::load_from(&ArtifactPaths::in_dir(dir))
    }

    /// Load classifier, standard scaler and min-max scaler (in that order),
    /// then check that all three agree on the feature count.
    pub fn load_from(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        tracing::info!("Loading classifier from {:?}", paths.classifier);
        let classifier: Classifier = load_artifact(&paths.classifier)?;

        tracing::info!("Loading standard scaler from {:?}", paths.standard_scaler);
        let standard: StandardScaler = load_artifact(&paths.standard_scaler)?;

        tracing::info!("Loading min-max scaler from {:?}", paths.min_max_scaler);
        let min_max: MinMaxScaler = load_artifact(&paths.min_max_scaler)?;

        tracing::info!(
            "Loaded {} classifier ({} classes)",
            classifier.kind(),
            classifier.classes().len()
        );

        let set = Self {
            min_max: Arc::new(min_max),
            standard: Arc::new(standard),
            classifier: Arc::new(classifier),
        };
        set.check_feature_counts()?;

        Ok(set)
    }

    /// Every artifact that declares a width must accept exactly `N_FEATURES`
    pub fn check_feature_counts(&self) -> Result<(), ArtifactError> {
        let declared = [
            (MinMaxScaler::NAME, self.min_max.n_features()),
            (StandardScaler::NAME, self.standard.n_features()),
            (Classifier::NAME, self.classifier.n_features()),
        ];

        for (artifact, width) in declared {
            match width {
                Some(actual) if actual != N_FEATURES => {
                    return Err(ArtifactError::FeatureCount {
                        artifact,
                        expected: N_FEATURES,
                        actual,
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
