//! Classifier output surfaced to callers.

use serde::{Deserialize, Serialize};

/// The scored outcome for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The record's identifier, when the upload carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_number: Option<String>,

    /// Predicted class: 1 is the positive class of the trained artifact.
    pub label: u8,

    /// Probability of the positive class.
    pub probability: f64,

    /// Human-readable verdict for `label`, taken from configuration.
    pub verdict: String,
}

impl Prediction {
    /// Returns `true` for the positive class.
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}
