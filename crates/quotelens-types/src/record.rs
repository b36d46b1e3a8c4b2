//! One raw input row.

use std::collections::HashMap;

use crate::error::{QuoteLensError, Result};
use crate::value::Value;

/// A single row of named, typed fields.
///
/// Field order is the order the fields were inserted (CSV header order).
/// Lookups are by name; a missing name is a [`QuoteLensError::Schema`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    names: Vec<String>,
    values: Vec<Value>,
    index: HashMap<String, usize>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.insert(name, value);
        }
        record
    }

    /// Insert or replace a field. New fields are appended at the end.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            self.values[idx] = value;
            return;
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.values.push(value);
    }

    /// Look up a field, failing with a schema error if it is absent.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.try_get(name).ok_or_else(|| QuoteLensError::schema(name))
    }

    /// Look up a field, returning `None` if it is absent.
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&idx| &self.values[idx])
    }

    /// Mutable access to a field, failing with a schema error if absent.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        match self.index.get(name) {
            Some(&idx) => Ok(&mut self.values[idx]),
            None => Err(QuoteLensError::schema(name)),
        }
    }

    /// Remove a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.index.remove(name)?;
        self.names.remove(idx);
        let value = self.values.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Whether the record has a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Iterate mutably over the values in field order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.values.iter_mut()
    }
}
