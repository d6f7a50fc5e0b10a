//! Crop Recommender
//!
//! Serves a pre-trained crop classifier behind a web form.
//!
//! Module layout:
//! - `features/`: form fields → fixed-order measurement vector
//! - `artifacts/`: JSON-encoded scalers and classifier, loaded once at startup
//! - `scaling/`: min-max then standard scaling
//! - `labels/`: class code → crop name
//! - `presentation/`: the result sentence shown to the user
//! - `predictor/`: the whole request pipeline
//! - `api_server/`, `web/`: Axum routes and Askama pages (feature `api`)

pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod labels;
pub mod predictor;
pub mod presentation;
pub mod scaling;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use artifacts::{ArtifactPaths, ArtifactSet, Classifier, MinMaxScaler, Predict, StandardScaler, Transform};
pub use config::ServerConfig;
pub use error::{ArtifactError, InferenceError, ParseError, PredictionError, TransformError};
pub use features::{FeatureVector, FEATURE_FIELDS, N_FEATURES};
pub use labels::{ClassCode, LabelTable, Resolution, CROP_NAMES};
pub use predictor::CropPredictor;
pub use presentation::Outcome;
pub use scaling::{ScaledVector, ScalingPipeline};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
