//! Feature pipeline configuration.
//!
//! Names the fields each pipeline step touches. Defaults match the
//! training-time schema of the quote dataset, so a stock deployment needs
//! no pipeline section at all.

use serde::{Deserialize, Serialize};

/// Field names and constants used by the feature pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Value the dataset uses to mean "missing".
    #[serde(default = "default_sentinel")]
    pub sentinel: i64,

    /// Raw cell contents read as the null marker.
    #[serde(default = "default_null_tokens", alias = "nullTokens")]
    pub null_tokens: Vec<String>,

    /// Unique identifier column; never reaches the classifier.
    #[serde(default = "default_id_field", alias = "idField")]
    pub id_field: String,

    /// Quote date column, formatted as [`PipelineConfig::date_format`].
    #[serde(default = "default_date_field", alias = "dateField")]
    pub date_field: String,

    /// `chrono` format string the date field must match.
    #[serde(default = "default_date_format", alias = "dateFormat")]
    pub date_format: String,

    /// Training label column; ignored when present in an upload.
    #[serde(default = "default_label_field", alias = "labelField")]
    pub label_field: String,

    /// Structurally integer fields re-coerced after the null fill.
    #[serde(default = "default_integer_fields", alias = "integerFields")]
    pub integer_fields: Vec<String>,

    /// Fields with a single value across the training population.
    #[serde(default = "default_constant_fields", alias = "constantFields")]
    pub constant_fields: Vec<String>,

    /// Numeric fields that may carry thousands separators.
    #[serde(default = "default_thousands_fields", alias = "thousandsFields")]
    pub thousands_fields: Vec<String>,

    /// Literal value substitutions applied before encoding.
    #[serde(default = "default_remaps")]
    pub remaps: Vec<ValueRemap>,

    /// Categorical fields that receive a conversion-rate feature.
    #[serde(default = "default_conversion_fields", alias = "conversionFields")]
    pub conversion_fields: Vec<String>,
}

/// Replace one literal text value of a field with another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRemap {
    /// Field to rewrite.
    pub field: String,
    /// Value to replace (matched exactly, whitespace included).
    pub from: String,
    /// Replacement category.
    pub to: String,
}

impl PipelineConfig {
    /// Input fields the pipeline drops without reading.
    pub fn is_constant(&self, field: &str) -> bool {
        self.constant_fields.iter().any(|f| f == field)
    }
}

fn default_sentinel() -> i64 {
    -1
}
fn default_null_tokens() -> Vec<String> {
    ["", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "NULL", "null", "None", "<NA>", "#N/A"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_id_field() -> String {
    "QuoteNumber".into()
}
fn default_date_field() -> String {
    "Original_Quote_Date".into()
}
fn default_date_format() -> String {
    "%Y-%m-%d".into()
}
fn default_label_field() -> String {
    "QuoteConversion_Flag".into()
}
fn default_integer_fields() -> Vec<String> {
    vec!["PersonalField84".into(), "PropertyField29".into()]
}
fn default_constant_fields() -> Vec<String> {
    vec!["PropertyField6".into(), "GeographicField10A".into()]
}
fn default_thousands_fields() -> Vec<String> {
    vec!["Field10".into()]
}
fn default_remaps() -> Vec<ValueRemap> {
    vec![ValueRemap {
        field: "GeographicField63".into(),
        from: " ".into(),
        to: "N".into(),
    }]
}
fn default_conversion_fields() -> Vec<String> {
    vec![
        "SalesField5".into(),
        "PersonalField9".into(),
        "SalesField1B".into(),
    ]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            null_tokens: default_null_tokens(),
            id_field: default_id_field(),
            date_field: default_date_field(),
            date_format: default_date_format(),
            label_field: default_label_field(),
            integer_fields: default_integer_fields(),
            constant_fields: default_constant_fields(),
            thousands_fields: default_thousands_fields(),
            remaps: default_remaps(),
            conversion_fields: default_conversion_fields(),
        }
    }
}
