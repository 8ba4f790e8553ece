// Threshold domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Upper,
    Lower,
}

/// A reference value drawn across a chart for comparison against the trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub label: String,
    pub kind: ThresholdKind,
    pub value: f64,
}

impl Threshold {
    #[cfg(test)]
    pub fn new(label: impl Into<String>, kind: ThresholdKind, value: f64) -> Self {
        Self {
            label: label.into(),
            kind,
            value,
        }
    }

    /// Text shown at the end of the threshold line, e.g. "WHO 24-h: 15"
    pub fn caption(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}
