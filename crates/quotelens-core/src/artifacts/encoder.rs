//! Fitted one-hot encoder.
//!
//! An encoder maps one categorical field's value to a fixed-width
//! indicator block over its training vocabulary. The unknown-category
//! policy is part of the artifact and must be spelled out; there is no
//! implicit library default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use quotelens_types::{QuoteLensError, Result, Value};

/// What to do with a value outside the fitted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Emit an all-zero indicator block.
    Ignore,
    /// Reject the record with a validation error.
    Error,
}

/// Serialized form of an encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSpec {
    /// Categorical field the encoder reads.
    pub field: String,
    /// Fitted vocabulary, in indicator-column order.
    pub categories: Vec<String>,
    /// Unknown-category policy.
    pub handle_unknown: HandleUnknown,
}

/// A validated one-hot encoder with an index over its vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EncoderSpec")]
pub struct OneHotEncoder {
    field: String,
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl OneHotEncoder {
    /// Build an encoder, rejecting empty or duplicated vocabularies.
    pub fn new(
        field: impl Into<String>,
        categories: Vec<String>,
        handle_unknown: HandleUnknown,
    ) -> Result<Self> {
        let field = field.into();
        if categories.is_empty() {
            return Err(QuoteLensError::configuration(format!(
                "encoder for '{field}' has an empty vocabulary"
            )));
        }
        let mut index = HashMap::with_capacity(categories.len());
        for (i, cat) in categories.iter().enumerate() {
            if index.insert(cat.clone(), i).is_some() {
                return Err(QuoteLensError::configuration(format!(
                    "encoder for '{field}' lists category '{cat}' twice"
                )));
            }
        }
        Ok(Self {
            field,
            categories,
            handle_unknown,
            index,
        })
    }

    /// The field this encoder reads.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The fitted vocabulary.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Unknown-category policy.
    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    /// Width of the indicator block.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Output column names, `<field>_<category>`.
    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |cat| format!("{}_{}", self.field, cat))
    }

    /// Append this value's indicator block to `out`.
    pub fn encode_into(&self, value: &Value, out: &mut Vec<f64>) -> Result<()> {
        let key = value.lookup_key();
        let hit = self.index.get(&key).copied();
        if hit.is_none() && self.handle_unknown == HandleUnknown::Error {
            return Err(QuoteLensError::validation(
                &self.field,
                format!("unknown category {value}"),
            ));
        }
        out.extend((0..self.width()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        Ok(())
    }
}

impl TryFrom<EncoderSpec> for OneHotEncoder {
    type Error = QuoteLensError;

    fn try_from(spec: EncoderSpec) -> Result<Self> {
        Self::new(spec.field, spec.categories, spec.handle_unknown)
    }
}
