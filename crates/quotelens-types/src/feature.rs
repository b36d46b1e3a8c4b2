//! Ordered feature schema and the numeric vectors that follow it.
//!
//! The schema is an explicit, ordered list of named fields. It is derived
//! once from the artifact bundle and shared by every vector the pipeline
//! produces, so column order is asserted structurally instead of falling
//! out of join order.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Where a feature column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// A cleaned numeric input column carried through unchanged.
    Passthrough,
    /// A per-record count synthesized by the pipeline.
    Derived,
    /// A component of the decomposed quote date.
    Date,
    /// A learned conversion rate looked up from a categorical value.
    ConversionRate,
    /// One column of a one-hot indicator block.
    Indicator,
}

/// One named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureField {
    /// Column name as the classifier knows it.
    pub name: String,
    /// Origin of the column.
    pub kind: FeatureKind,
}

/// The ordered list of output columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    fields: Vec<FeatureField>,
}

impl FeatureSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, kind: FeatureKind) {
        self.fields.push(FeatureField {
            name: name.into(),
            kind,
        });
    }

    /// All columns, in order.
    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    /// Column names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Position of a named column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of columns of the given kind.
    pub fn count_of(&self, kind: FeatureKind) -> usize {
        self.fields.iter().filter(|f| f.kind == kind).count()
    }
}

/// A fully numeric record aligned with a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair values with their schema.
    ///
    /// Returns `None` if the lengths disagree.
    pub fn new(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Option<Self> {
        (schema.len() == values.len()).then_some(Self { schema, values })
    }

    /// The schema the values follow.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// The values, in schema order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named column.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// Values of every column of `kind`, in schema order.
    pub fn values_of(&self, kind: FeatureKind) -> Vec<f64> {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(f, _)| f.kind == kind)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Little-endian byte image of the values, for exact comparisons.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the vector has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns: Vec<&str> = self.schema.names().collect();
        let mut state = serializer.serialize_struct("FeatureVector", 2)?;
        state.serialize_field("columns", &columns)?;
        state.serialize_field("values", &self.values)?;
        state.end()
    }
}
