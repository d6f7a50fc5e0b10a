//! Error types
//!
//! Two families:
//! - `ArtifactError`: fatal, raised while loading model artifacts at startup
//! - `PredictionError`: request-local, rendered back to the user as `Error: ...`

use std::path::PathBuf;
use thiserror::Error;

/// Startup failure while loading or validating an artifact file.
///
/// Every variant names the artifact so the startup log says which file is bad.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {artifact} from {path:?}")]
    Read {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {artifact} from {path:?}")]
    Decode {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {artifact} in {path:?}: {reason}")]
    Invalid {
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("{artifact} expects {actual} features, but the pipeline feeds it {expected}")]
    FeatureCount {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A required form field was missing or not a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("could not convert string to float: '{value}'")]
    NotANumber { field: &'static str, value: String },
}

/// A scaler rejected its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("X has {actual} features, but {stage} is expecting {expected} features as input")]
    FeatureCount {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} returned no rows for a single-sample input")]
    EmptyOutput { stage: &'static str },
}

/// The classifier rejected its input or returned nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("X has {actual} features, but the classifier is expecting {expected} features as input")]
    FeatureCount { expected: usize, actual: usize },

    #[error("classifier returned an empty prediction")]
    EmptyPrediction,

    #[error("malformed classifier: {0}")]
    Malformed(String),
}

/// Any failure between form parsing and classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
