//! Output schema derivation.
//!
//! Column order: passthrough input columns (input order), the derived
//! counts and date parts, the conversion-rate features (designated field
//! order), then each encoder's indicator block (encoder order).

use std::collections::HashSet;

use quotelens_types::config::PipelineConfig;
use quotelens_types::{FeatureKind, FeatureSchema, QuoteLensError, Result};

use crate::artifacts::{ConversionRateTable, OneHotEncoder};

pub const MISSING_VALUE_COUNT: &str = "missing_value_count";
pub const QUOTE_YEAR: &str = "Quote_Year";
pub const QUOTE_QUARTER: &str = "Quote_Quarter";
pub const QUOTE_MONTH: &str = "Quote_Month";
pub const QUOTE_DAY: &str = "Quote_Day";
pub const QUOTE_DAY_OF_WEEK: &str = "Quote_DayOfWeek";
pub const NEGATION_COUNT: &str = "#_Negation";
pub const AFFIRMATION_COUNT: &str = "#_Affirmation";
pub const SAME_VALUE_COUNT: &str = "same_value_count";

/// Date-part columns in emission order.
pub const DATE_COLUMNS: [&str; 5] = [
    QUOTE_YEAR,
    QUOTE_QUARTER,
    QUOTE_MONTH,
    QUOTE_DAY,
    QUOTE_DAY_OF_WEEK,
];

/// Derive the passthrough column list and the full output schema.
pub fn derive(
    input_columns: &[String],
    pipeline: &PipelineConfig,
    tables: &[ConversionRateTable],
    encoders: &[OneHotEncoder],
) -> Result<(Vec<String>, FeatureSchema)> {
    let encoded: HashSet<&str> = encoders.iter().map(|e| e.field()).collect();
    let passthrough: Vec<String> = input_columns
        .iter()
        .filter(|c| {
            !pipeline.is_constant(c)
                && **c != pipeline.date_field
                && **c != pipeline.id_field
                && **c != pipeline.label_field
                && !encoded.contains(c.as_str())
        })
        .cloned()
        .collect();

    let mut schema = FeatureSchema::new();
    for col in &passthrough {
        schema.push(col.clone(), FeatureKind::Passthrough);
    }
    schema.push(MISSING_VALUE_COUNT, FeatureKind::Derived);
    for col in DATE_COLUMNS {
        schema.push(col, FeatureKind::Date);
    }
    schema.push(NEGATION_COUNT, FeatureKind::Derived);
    schema.push(AFFIRMATION_COUNT, FeatureKind::Derived);
    schema.push(SAME_VALUE_COUNT, FeatureKind::Derived);
    for field in &pipeline.conversion_fields {
        let table = tables.iter().find(|t| &t.field == field).ok_or_else(|| {
            QuoteLensError::configuration(format!(
                "no conversion-rate table for designated field '{field}'"
            ))
        })?;
        schema.push(table.feature.clone(), FeatureKind::ConversionRate);
    }
    for enc in encoders {
        for name in enc.feature_names() {
            schema.push(name, FeatureKind::Indicator);
        }
    }

    let mut seen = HashSet::with_capacity(schema.len());
    if let Some(dup) = schema.names().find(|n| !seen.insert(*n)) {
        return Err(QuoteLensError::configuration(format!(
            "feature column '{dup}' would be emitted twice"
        )));
    }

    Ok((passthrough, schema))
}
