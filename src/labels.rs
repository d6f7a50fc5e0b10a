//! Crop Labels
//!
//! Fixed class-code → crop-name table. Codes are 1-based in the order the
//! classifier was trained on.

use rustc_hash::FxHashMap;

/// Integer label emitted by the classifier
pub type ClassCode = i64;

/// Crop names for codes 1..=22
pub const CROP_NAMES: [&str; 22] = [
    "Rice",
    "Maize",
    "Jute",
    "Cotton",
    "Coconut",
    "Papaya",
    "Orange",
    "Apple",
    "Muskmelon",
    "Watermelon",
    "Grapes",
    "Mango",
    "Banana",
    "Pomegranate",
    "Lentil",
    "Blackgram",
    "Mungbean",
    "Mothbeans",
    "Pigeonpeas",
    "Kidneybeans",
    "Chickpea",
    "Coffee",
];

/// Result of looking up a class code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(&'static str),
    /// The classifier returned a code outside the table. Not an error.
    Unknown,
}

/// Immutable lookup built once at startup
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: FxHashMap<ClassCode, &'static str>,
}

impl LabelTable {
    /// The 22-crop table
    pub fn standard() -> Self {
        let labels = CROP_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| (i as ClassCode + 1, *name))
            .collect();
        Self { labels }
    }

    pub fn resolve(&self, code: ClassCode) -> Resolution {
        match self.labels.get(&code) {
            Some(name) => Resolution::Resolved(*name),
            None => Resolution::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::standard()
    }
}
