//! Result sentence shown on the form page.
//!
//! This string is all the page template ever receives; there is no
//! structured error object past this point.

use std::fmt;

use crate::error::PredictionError;
use crate::labels::Resolution;

/// Final outcome of one prediction request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Recommended(&'static str),
    Undetermined,
    Failed(String),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<Result<Resolution, PredictionError>> for Outcome {
    fn from(result: Result<Resolution, PredictionError>) -> Self {
        match result {
            Ok(Resolution::Resolved(crop)) => Outcome::Recommended(crop),
            Ok(Resolution::Unknown) => Outcome::Undetermined,
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Recommended(crop) => {
                write!(f, "{} is the best crop to be cultivated right there", crop)
            }
            Outcome::Undetermined => f.write_str("Could not determine the best crop."),
            Outcome::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}
