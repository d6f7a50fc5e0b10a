//! Feature Extraction
//!
//! Pulls the seven soil/climate measurements out of a submitted form and
//! assembles them into a fixed-order vector.
//!
//! Form field names are an external contract. `Phosporus` is misspelled in
//! every deployed form and stays that way.

use std::collections::HashMap;

use crate::error::ParseError;

/// Number of measurements the model consumes
pub const N_FEATURES: usize = 7;

/// Form field names, in model input order
pub const FEATURE_FIELDS: [&str; N_FEATURES] = [
    "Nitrogen",
    "Phosporus",
    "Potassium",
    "Temperature",
    "Humidity",
    "pH",
    "Rainfall",
];

/// One sample of raw measurements, in `FEATURE_FIELDS` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    /// Parse all seven fields from a form submission.
    ///
    /// Fails on the first missing or non-numeric field; no partial vector is
    /// ever produced. Extra fields are ignored. No range checks are applied,
    /// so physically odd values (negative rainfall) pass through.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, ParseError> {
        let mut values = [0.0; N_FEATURES];

        for (slot, field) in values.iter_mut().zip(FEATURE_FIELDS) {
            let raw = form.get(field).ok_or(ParseError::MissingField(field))?;
            *slot = parse_measurement(field, raw)?;
        }

        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.0
    }

    /// Single-row batch, the shape the artifacts consume
    pub fn to_batch(&self) -> Vec<Vec<f64>> {
        vec![self.0.to_vec()]
    }
}

/// Parse one measurement. Surrounding whitespace is ignored; infinities and
/// NaN are rejected.
fn parse_measurement(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::NotANumber {
            field,
            value: raw.to_string(),
        })
}
