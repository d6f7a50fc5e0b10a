//! Crop Predictor
//!
//! One request, start to finish:
//!
//! ```text
//! form -> FeatureVector -> min-max -> standard -> classifier -> label -> sentence
//! ```
//!
//! Holds only read-only artifacts, so a single instance is shared by every
//! request without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::artifacts::{ArtifactSet, Predict, Transform};
use crate::error::{InferenceError, PredictionError};
use crate::features::FeatureVector;
use crate::labels::{ClassCode, LabelTable, Resolution};
use crate::presentation::Outcome;
use crate::scaling::ScalingPipeline;

#[derive(Clone)]
pub struct CropPredictor {
    scaling: ScalingPipeline,
    classifier: Arc<dyn Predict>,
    labels: Arc<LabelTable>,
}

impl CropPredictor {
    pub fn new(artifacts: ArtifactSet, labels: LabelTable) -> Self {
        Self::from_parts(artifacts.min_max, artifacts.standard, artifacts.classifier, labels)
    }

    pub fn from_parts(
        min_max: Arc<dyn Transform>,
        standard: Arc<dyn Transform>,
        classifier: Arc<dyn Predict>,
        labels: LabelTable,
    ) -> Self {
        Self {
            scaling: ScalingPipeline::new(min_max, standard),
            classifier,
            labels: Arc::new(labels),
        }
    }

    /// Scale and classify one sample. Only the first prediction is used.
    pub fn classify(&self, features: &FeatureVector) -> Result<ClassCode, PredictionError> {
        let scaled = self.scaling.apply(features)?;
        let predictions = self.classifier.predict(&scaled.into_batch())?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| InferenceError::EmptyPrediction.into())
    }

    /// Parse, classify and look up the crop for one form submission
    pub fn resolve(&self, form: &HashMap<String, String>) -> Result<Resolution, PredictionError> {
        let features = FeatureVector::from_form(form)?;
        tracing::debug!("Features: {:?}", features.values());

        let code = self.classify(&features)?;
        let resolution = self.labels.resolve(code);
        tracing::debug!("Class code {} -> {:?}", code, resolution);

        Ok(resolution)
    }

    /// Full request pipeline; failures become an `Outcome::Failed`
    pub fn recommend(&self, form: &HashMap<String, String>) -> Outcome {
        let result = self.resolve(form);
        if let Err(e) = &result {
            tracing::warn!("Prediction error: {}", e);
        }
        Outcome::from(result)
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }
}
