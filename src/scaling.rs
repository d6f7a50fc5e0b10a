//! Two-stage feature scaling: min-max first, then standard.
//!
//! The classifier was fitted on features scaled in exactly this order.
//! Swapping the stages gives different numbers and wrong predictions.

use std::sync::Arc;

use crate::artifacts::Transform;
use crate::error::TransformError;
use crate::features::FeatureVector;

/// Feature vector after both scaling stages
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledVector(Vec<f64>);

impl ScaledVector {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn into_batch(self) -> Vec<Vec<f64>> {
        vec![self.0]
    }
}

#[derive(Clone)]
pub struct ScalingPipeline {
    min_max: Arc<dyn Transform>,
    standard: Arc<dyn Transform>,
}

impl ScalingPipeline {
    pub fn new(min_max: Arc<dyn Transform>, standard: Arc<dyn Transform>) -> Self {
        Self { min_max, standard }
    }

    pub fn apply(&self, features: &FeatureVector) -> Result<ScaledVector, TransformError> {
        let intermediate = self.min_max.transform(&features.to_batch())?;
        let scaled = self.standard.transform(&intermediate)?;

        scaled
            .into_iter()
            .next()
            .map(ScaledVector)
            .ok_or(TransformError::EmptyOutput { stage: "scaling pipeline" })
    }
}
