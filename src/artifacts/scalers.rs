//! Feature Scalers
//!
//! Fitted parameters use the attribute names of the usual Python
//! implementations so exported artifacts map one-to-one:
//! - Min-max: `data_min`, `data_max`, `feature_range`
//! - Standard: `mean`, `scale`
//!
//! Constant features (zero range or zero scale) divide by 1 instead of 0.

use serde::Deserialize;

use super::{Artifact, Transform};
use crate::error::TransformError;

/// Scale factors below this are treated as zero
const ZERO_SCALE_TOLERANCE: f64 = 10.0 * f64::EPSILON;

fn handle_zero_scale(scale: f64) -> f64 {
    if scale.abs() < ZERO_SCALE_TOLERANCE {
        1.0
    } else {
        scale
    }
}

fn check_finite(name: &str, values: &[f64]) -> Result<(), String> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(format!("{}[{}] is not finite", name, i)),
        None => Ok(()),
    }
}

fn check_width(stage: &'static str, expected: usize, samples: &[Vec<f64>]) -> Result<(), TransformError> {
    match samples.iter().find(|row| row.len() != expected) {
        Some(row) => Err(TransformError::FeatureCount {
            stage,
            expected,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Rescales each feature from its fitted `[data_min, data_max]` into
/// `feature_range`.
#[derive(Debug, Clone, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    feature_range: [f64; 2],
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        }
    }

    pub fn with_feature_range(mut self, lo: f64, hi: f64) -> Self {
        self.feature_range = [lo, hi];
        self
    }
}

impl Artifact for MinMaxScaler {
    const NAME: &'static str = "min-max scaler";

    fn validate(&self) -> Result<(), String> {
        if self.data_min.is_empty() {
            return Err("data_min is empty".to_string());
        }
        if self.data_min.len() != self.data_max.len() {
            return Err(format!(
                "data_min has {} values but data_max has {}",
                self.data_min.len(),
                self.data_max.len()
            ));
        }
        check_finite("data_min", &self.data_min)?;
        check_finite("data_max", &self.data_max)?;
        check_finite("feature_range", &self.feature_range)?;

        let [lo, hi] = self.feature_range;
        if lo >= hi {
            return Err(format!(
                "minimum of feature_range must be smaller than maximum, got [{}, {}]",
                lo, hi
            ));
        }

        Ok(())
    }
}

impl Transform for MinMaxScaler {
    fn transform(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, TransformError> {
        // Both bounds must match the sample, even when unvalidated
        check_width("MinMaxScaler", self.data_min.len(), samples)?;
        check_width("MinMaxScaler", self.data_max.len(), samples)?;

        let [lo, hi] = self.feature_range;
        Ok(samples
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.data_min)
                    .zip(&self.data_max)
                    .map(|((&x, &min), &max)| {
                        // x * scale + (lo - min * scale)
                        let scale = (hi - lo) / handle_zero_scale(max - min);
                        x * scale + lo - min * scale
                    })
                    .collect()
            })
            .collect())
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.data_min.len())
    }
}

/// Centers each feature on its fitted mean and divides by its fitted scale.
///
/// A `null` mean skips centering; a `null` scale skips scaling.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new(mean: Option<Vec<f64>>, scale: Option<Vec<f64>>) -> Self {
        Self { mean, scale }
    }

    fn width(&self) -> Option<usize> {
        self.mean
            .as_ref()
            .or(self.scale.as_ref())
            .map(|v| v.len())
    }
}

impl Artifact for StandardScaler {
    const NAME: &'static str = "standard scaler";

    fn validate(&self) -> Result<(), String> {
        let width = self
            .width()
            .ok_or_else(|| "at least one of mean or scale must be present".to_string())?;
        if width == 0 {
            return Err("mean and scale are empty".to_string());
        }

        if let (Some(mean), Some(scale)) = (&self.mean, &self.scale) {
            if mean.len() != scale.len() {
                return Err(format!(
                    "mean has {} values but scale has {}",
                    mean.len(),
                    scale.len()
                ));
            }
        }
        if let Some(mean) = &self.mean {
            check_finite("mean", mean)?;
        }
        if let Some(scale) = &self.scale {
            check_finite("scale", scale)?;
        }

        Ok(())
    }
}

impl Transform for StandardScaler {
    fn transform(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, TransformError> {
        let mean = self.mean.as_deref();
        let scale = self.scale.as_deref();
        for params in [mean, scale].into_iter().flatten() {
            check_width("StandardScaler", params.len(), samples)?;
        }

        Ok(samples
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, &x)| {
                        let centered = x - mean.and_then(|m| m.get(j)).copied().unwrap_or(0.0);
                        let divisor = scale
                            .and_then(|s| s.get(j))
                            .copied()
                            .map_or(1.0, handle_zero_scale);
                        centered / divisor
                    })
                    .collect()
            })
            .collect())
    }

    fn n_features(&self) -> Option<usize> {
        self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_min_max_default_range() {
        let scaler = MinMaxScaler::new(vec![0.0, 20.2], vec![140.0, 298.6]);
        scaler.validate().unwrap();

        let out = scaler.transform(&[vec![70.0, 20.2], vec![140.0, 298.6]]).unwrap();
        assert_relative_eq!(out[0][0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[0][1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out[1][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_custom_range_and_extrapolation() {
        let scaler = MinMaxScaler::new(vec![0.0], vec![10.0]).with_feature_range(-1.0, 1.0);
        scaler.validate().unwrap();

        let out = scaler.transform(&[vec![5.0], vec![-10.0]]).unwrap();
        assert_relative_eq!(out[0][0], 0.0, epsilon = 1e-12);
        // Values outside the fitted range are not clipped
        assert_relative_eq!(out[1][0], -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_constant_feature() {
        let scaler = MinMaxScaler::new(vec![3.0], vec![3.0]);
        let out = scaler.transform(&[vec![4.0]]).unwrap();
        assert_relative_eq!(out[0][0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_max_rejects_wrong_width() {
        let scaler = MinMaxScaler::new(vec![0.0; 7], vec![1.0; 7]);
        let err = scaler.transform(&[vec![1.0; 6]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 6 features, but MinMaxScaler is expecting 7 features as input"
        );
    }

    #[test]
    fn test_min_max_validation() {
        assert!(MinMaxScaler::new(vec![], vec![]).validate().is_err());
        assert!(MinMaxScaler::new(vec![0.0, 1.0], vec![1.0]).validate().is_err());
        assert!(MinMaxScaler::new(vec![f64::NAN], vec![1.0]).validate().is_err());
        assert!(MinMaxScaler::new(vec![0.0], vec![1.0])
            .with_feature_range(1.0, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_min_max_decodes_without_feature_range() {
        let scaler: MinMaxScaler =
            serde_json::from_str(r#"{"data_min": [0.0], "data_max": [4.0]}"#).unwrap();
        let out = scaler.transform(&[vec![1.0]]).unwrap();
        assert_relative_eq!(out[0][0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_standard_center_and_scale() {
        let scaler = StandardScaler::new(Some(vec![0.5, 10.0]), Some(vec![0.25, 2.0]));
        scaler.validate().unwrap();

        let out = scaler.transform(&[vec![1.0, 6.0]]).unwrap();
        assert_relative_eq!(out[0][0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[0][1], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standard_partial_parameters() {
        let center_only = StandardScaler::new(Some(vec![1.0]), None);
        assert_relative_eq!(center_only.transform(&[vec![3.0]]).unwrap()[0][0], 2.0);

        let scale_only = StandardScaler::new(None, Some(vec![4.0]));
        assert_relative_eq!(scale_only.transform(&[vec![3.0]]).unwrap()[0][0], 0.75);

        let zero_scale = StandardScaler::new(Some(vec![1.0]), Some(vec![0.0]));
        assert_relative_eq!(zero_scale.transform(&[vec![3.0]]).unwrap()[0][0], 2.0);
    }

    #[test]
    fn test_standard_validation() {
        assert!(StandardScaler::new(None, None).validate().is_err());
        assert!(StandardScaler::new(Some(vec![0.0; 7]), Some(vec![1.0; 3]))
            .validate()
            .is_err());
        assert!(StandardScaler::new(Some(vec![f64::INFINITY]), None)
            .validate()
            .is_err());
    }

    #[test]
    fn test_unvalidated_ragged_scalers_return_errors() {
        let min_max = MinMaxScaler::new(vec![0.0; 7], vec![1.0; 3]);
        assert_eq!(
            min_max.transform(&[vec![1.0; 7]]),
            Err(TransformError::FeatureCount { stage: "MinMaxScaler", expected: 3, actual: 7 })
        );

        let standard = StandardScaler::new(Some(vec![0.0; 7]), Some(vec![1.0; 3]));
        assert_eq!(
            standard.transform(&[vec![1.0; 7]]),
            Err(TransformError::FeatureCount { stage: "StandardScaler", expected: 3, actual: 7 })
        );
    }

    #[test]
    fn test_standard_rejects_wrong_width() {
        let scaler = StandardScaler::new(Some(vec![0.0; 7]), Some(vec![1.0; 7]));
        assert!(matches!(
            scaler.transform(&[vec![1.0; 8]]),
            Err(TransformError::FeatureCount { stage: "StandardScaler", expected: 7, actual: 8 })
        ));
    }
}
