//! Individual pipeline steps.
//!
//! Each step reads or rewrites a single record. None of them look at any
//! other record, so a step's output for a record never depends on what
//! else was uploaded with it.

use quotelens_types::config::PipelineConfig;
use quotelens_types::{QuoteLensError, RawRecord, Result, Value};

use crate::artifacts::ConversionRateTable;

/// Step 1: null cells plus sentinel cells in this record.
pub fn count_missing(record: &RawRecord, sentinel: i64) -> usize {
    record
        .iter()
        .filter(|(_, v)| v.is_null() || v.is_sentinel(sentinel))
        .count()
}

/// Step 2: replace nulls with the sentinel, then re-coerce integer fields.
pub fn fill_nulls(record: &mut RawRecord, config: &PipelineConfig) -> Result<()> {
    for value in record.values_mut() {
        if value.is_null() {
            *value = Value::Int(config.sentinel);
        }
    }
    for field in &config.integer_fields {
        let value = record.get_mut(field)?;
        *value = Value::Int(to_integer(field, value)?);
    }
    Ok(())
}

/// Step 3: drop fields that were constant across the training population.
pub fn drop_constant(record: &mut RawRecord, config: &PipelineConfig) {
    for field in &config.constant_fields {
        record.remove(field);
    }
}

/// Step 4 (numeric half): strip thousands separators and coerce to integer.
pub fn strip_thousands(record: &mut RawRecord, config: &PipelineConfig) -> Result<()> {
    for field in &config.thousands_fields {
        let value = record.get_mut(field)?;
        if let Value::Text(text) = value {
            let cleaned = text.replace(',', "");
            let parsed = cleaned.trim().parse::<i64>().map_err(|_| {
                QuoteLensError::validation(field, format!("expected an integer, got {text:?}"))
            })?;
            *value = Value::Int(parsed);
        }
    }
    Ok(())
}

/// Step 4 (categorical half): apply literal value remaps.
pub fn apply_remaps(record: &mut RawRecord, config: &PipelineConfig) -> Result<()> {
    for remap in &config.remaps {
        let value = record.get_mut(&remap.field)?;
        if value.as_text() == Some(remap.from.as_str()) {
            *value = Value::Text(remap.to.clone());
        }
    }
    Ok(())
}

/// Step 6: (negations, affirmations) over the binary fields.
///
/// Negative is `"N"` or numeric 0; affirmative is `"Y"` or numeric 1.
pub fn count_binary(record: &RawRecord, binary_features: &[String]) -> Result<(usize, usize)> {
    let mut negations = 0;
    let mut affirmations = 0;
    for field in binary_features {
        let value = record.get(field)?;
        let number = value.as_f64();
        match value.as_text() {
            Some("N") => negations += 1,
            Some("Y") => affirmations += 1,
            _ if number == Some(0.0) => negations += 1,
            _ if number == Some(1.0) => affirmations += 1,
            _ => {}
        }
    }
    Ok((negations, affirmations))
}

/// Step 7: pairs whose two values are equal and not the sentinel.
pub fn count_equal_pairs(
    record: &RawRecord,
    pairs: &[(String, String)],
    sentinel: i64,
) -> Result<usize> {
    let mut same = 0;
    for (left, right) in pairs {
        let a = record.get(left)?;
        let b = record.get(right)?;
        if a.loosely_eq(b) && !a.is_sentinel(sentinel) {
            same += 1;
        }
    }
    Ok(same)
}

/// Step 8: one rate per designated field, in designation order.
///
/// A designated field without a table is a configuration error, never a
/// silent default.
pub fn lookup_rates(
    record: &RawRecord,
    fields: &[String],
    tables: &[ConversionRateTable],
) -> Result<Vec<f64>> {
    fields
        .iter()
        .map(|field| {
            let table = tables.iter().find(|t| &t.field == field).ok_or_else(|| {
                QuoteLensError::configuration(format!(
                    "no conversion-rate table for designated field '{field}'"
                ))
            })?;
            Ok(table.rate(record.get(field)?))
        })
        .collect()
}

/// Coerce a cell to an integer the way a cast of a numeric column would.
fn to_integer(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(f.trunc() as i64),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .or_else(|_| s.trim().parse::<f64>().map(|f| f.trunc() as i64))
            .map_err(|_| QuoteLensError::validation(field, format!("expected an integer, got {s:?}"))),
        Value::Null => Err(QuoteLensError::validation(field, "expected an integer, got null")),
    }
}
