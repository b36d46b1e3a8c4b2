//! Read-only artifact bundle.
//!
//! The bundle holds everything fitted at training time that the feature
//! pipeline needs: the ordered input schema, conversion-rate tables,
//! one-hot encoders, the binary-field list and the equality pair list.
//! It is loaded once before serving, validated as a whole, and then only
//! ever read through shared references.
//!
//! Any missing or malformed artifact is a [`QuoteLensError::Configuration`];
//! there is no partial-start mode.

pub mod encoder;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use quotelens_types::config::{ArtifactsConfig, PipelineConfig};
use quotelens_types::{FeatureSchema, QuoteLensError, Result, Value};

use crate::pipeline::schema;

pub use encoder::{EncoderSpec, HandleUnknown, OneHotEncoder};

// ── Artifact file formats ───────────────────────────────────────────────

/// `schema.json`: raw input columns in training order (label excluded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchemaFile {
    pub columns: Vec<String>,
}

/// `conversion_rates.json`: one table per designated categorical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRatesFile {
    pub tables: Vec<ConversionRateTable>,
}

/// `cat_encoders.json`: encoders in indicator-block order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodersFile {
    pub encoders: Vec<OneHotEncoder>,
}

/// Learned outcome rate per category value of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRateTable {
    /// Categorical field the table is keyed on.
    pub field: String,
    /// Name of the feature column the rate is emitted as.
    pub feature: String,
    /// Rate used for values absent from [`ConversionRateTable::rates`].
    pub default: f64,
    /// Category lookup key -> learned rate.
    pub rates: HashMap<String, f64>,
}

impl ConversionRateTable {
    /// Exact-match lookup of a value, falling back to the default.
    pub fn rate(&self, value: &Value) -> f64 {
        self.rates
            .get(&value.lookup_key())
            .copied()
            .unwrap_or(self.default)
    }

    fn validate(&self) -> Result<()> {
        let in_range = |r: f64| r.is_finite() && (0.0..=1.0).contains(&r);
        if !in_range(self.default) {
            return Err(QuoteLensError::configuration(format!(
                "conversion table '{}' has default rate {} outside [0, 1]",
                self.field, self.default
            )));
        }
        if let Some((key, rate)) = self.rates.iter().find(|(_, r)| !in_range(**r)) {
            return Err(QuoteLensError::configuration(format!(
                "conversion table '{}' maps '{key}' to {rate}, outside [0, 1]",
                self.field
            )));
        }
        Ok(())
    }
}

// ── Bundle ──────────────────────────────────────────────────────────────

/// In-memory artifact parts, before validation.
#[derive(Debug, Clone, Default)]
pub struct ArtifactParts {
    pub input_columns: Vec<String>,
    pub conversion_tables: Vec<ConversionRateTable>,
    pub encoders: Vec<OneHotEncoder>,
    pub binary_features: Vec<String>,
    pub feature_pairs: Vec<String>,
}

/// The validated, immutable artifact bundle.
#[derive(Debug)]
pub struct ArtifactBundle {
    pipeline: PipelineConfig,
    input_columns: Vec<String>,
    conversion_tables: Vec<ConversionRateTable>,
    encoders: Vec<OneHotEncoder>,
    binary_features: Vec<String>,
    feature_pairs: Vec<(String, String)>,
    passthrough: Vec<String>,
    feature_schema: Arc<FeatureSchema>,
}

impl ArtifactBundle {
    /// Load every artifact file named by `artifacts` and validate the set.
    pub fn load(artifacts: &ArtifactsConfig, pipeline: &PipelineConfig) -> Result<Self> {
        debug!(dir = %artifacts.dir.display(), "loading artifact bundle");

        let schema: InputSchemaFile = read_json(&artifacts.resolve(&artifacts.schema))?;
        let rates: ConversionRatesFile =
            read_json(&artifacts.resolve(&artifacts.conversion_rates))?;
        let encoders: EncodersFile = read_json(&artifacts.resolve(&artifacts.encoders))?;
        let binary_features: Vec<String> =
            read_json(&artifacts.resolve(&artifacts.binary_features))?;
        let feature_pairs: Vec<String> = read_json(&artifacts.resolve(&artifacts.feature_pairs))?;

        let bundle = Self::from_parts(
            ArtifactParts {
                input_columns: schema.columns,
                conversion_tables: rates.tables,
                encoders: encoders.encoders,
                binary_features,
                feature_pairs,
            },
            pipeline.clone(),
        )?;

        info!(
            input_columns = bundle.input_columns.len(),
            encoders = bundle.encoders.len(),
            conversion_tables = bundle.conversion_tables.len(),
            binary_features = bundle.binary_features.len(),
            feature_pairs = bundle.feature_pairs.len(),
            features = bundle.feature_schema.len(),
            "artifact bundle loaded"
        );
        Ok(bundle)
    }

    /// Validate in-memory parts and derive the output feature schema.
    pub fn from_parts(parts: ArtifactParts, pipeline: PipelineConfig) -> Result<Self> {
        let ArtifactParts {
            input_columns,
            conversion_tables,
            encoders,
            binary_features,
            feature_pairs,
        } = parts;

        if input_columns.is_empty() {
            return Err(QuoteLensError::configuration("input schema lists no columns"));
        }
        let mut known = HashSet::with_capacity(input_columns.len());
        for col in &input_columns {
            if !known.insert(col.as_str()) {
                return Err(QuoteLensError::configuration(format!(
                    "input schema lists column '{col}' twice"
                )));
            }
        }
        // Columns every later step may read: present at input, not dropped as constant.
        let usable = |field: &str, what: &str| -> Result<()> {
            if !known.contains(field) || pipeline.is_constant(field) {
                return Err(QuoteLensError::configuration(format!(
                    "{what} field '{field}' is not a usable input column"
                )));
            }
            Ok(())
        };

        usable(&pipeline.date_field, "date")?;
        for field in pipeline
            .integer_fields
            .iter()
            .chain(&pipeline.thousands_fields)
            .chain(pipeline.remaps.iter().map(|r| &r.field))
        {
            usable(field, "normalized")?;
        }

        for table in &conversion_tables {
            usable(&table.field, "conversion-rate")?;
            table.validate()?;
        }
        for field in &pipeline.conversion_fields {
            if !conversion_tables.iter().any(|t| &t.field == field) {
                return Err(QuoteLensError::configuration(format!(
                    "no conversion-rate table for designated field '{field}'"
                )));
            }
        }

        let mut encoded = HashSet::with_capacity(encoders.len());
        for enc in &encoders {
            usable(enc.field(), "encoded")?;
            if !encoded.insert(enc.field()) {
                return Err(QuoteLensError::configuration(format!(
                    "two encoders for field '{}'",
                    enc.field()
                )));
            }
        }

        for field in &binary_features {
            usable(field, "binary")?;
        }

        if feature_pairs.len() % 2 != 0 {
            return Err(QuoteLensError::configuration(format!(
                "feature pair list has odd length {}",
                feature_pairs.len()
            )));
        }
        for field in &feature_pairs {
            usable(field, "paired")?;
        }
        let feature_pairs: Vec<(String, String)> = feature_pairs
            .chunks_exact(2)
            .map(|p| (p[0].clone(), p[1].clone()))
            .collect();

        let (passthrough, feature_schema) =
            schema::derive(&input_columns, &pipeline, &conversion_tables, &encoders)?;

        Ok(Self {
            pipeline,
            input_columns,
            conversion_tables,
            encoders,
            binary_features,
            feature_pairs,
            passthrough,
            feature_schema: Arc::new(feature_schema),
        })
    }

    /// Pipeline settings the bundle was validated against.
    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Raw input columns in training order.
    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    /// Input columns an upload must carry (constant fields are optional).
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        self.input_columns
            .iter()
            .map(String::as_str)
            .filter(|c| !self.pipeline.is_constant(c))
    }

    /// Conversion-rate table for a designated field.
    pub fn conversion_table(&self, field: &str) -> Option<&ConversionRateTable> {
        self.conversion_tables.iter().find(|t| t.field == field)
    }

    /// All conversion-rate tables.
    pub fn conversion_tables(&self) -> &[ConversionRateTable] {
        &self.conversion_tables
    }

    /// Encoders in indicator-block order.
    pub fn encoders(&self) -> &[OneHotEncoder] {
        &self.encoders
    }

    /// Binary field names.
    pub fn binary_features(&self) -> &[String] {
        &self.binary_features
    }

    /// Field pairs compared by the equality count.
    pub fn feature_pairs(&self) -> &[(String, String)] {
        &self.feature_pairs
    }

    /// Input columns carried through to the feature vector unchanged.
    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough
    }

    /// The ordered output schema every feature vector follows.
    pub fn feature_schema(&self) -> &Arc<FeatureSchema> {
        &self.feature_schema
    }
}

/// Read and parse one JSON artifact, reporting failures as configuration errors.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        QuoteLensError::configuration(format!("failed to read artifact {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        QuoteLensError::configuration(format!("failed to parse artifact {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn parts() -> ArtifactParts {
        fixtures::artifact_parts()
    }

    fn expect_config_err(parts: ArtifactParts, needle: &str) {
        let err = ArtifactBundle::from_parts(parts, PipelineConfig::default()).unwrap_err();
        assert!(
            matches!(err, QuoteLensError::Configuration { ref reason } if reason.contains(needle)),
            "expected configuration error mentioning '{needle}', got {err}"
        );
    }

    #[test]
    fn fixture_parts_validate() {
        let bundle = ArtifactBundle::from_parts(parts(), PipelineConfig::default()).unwrap();
        assert_eq!(bundle.feature_pairs().len(), 2);
        assert_eq!(bundle.feature_schema().len(), fixtures::FEATURE_COUNT);
        assert!(bundle.conversion_table("SalesField5").is_some());
        assert!(!bundle.required_columns().any(|c| c == "PropertyField6"));
    }

    #[test]
    fn rejects_odd_pair_list() {
        let mut p = parts();
        p.feature_pairs.pop();
        expect_config_err(p, "odd length");
    }

    #[test]
    fn rejects_rate_out_of_range() {
        let mut p = parts();
        p.conversion_tables[0].rates.insert("9".into(), 1.5);
        expect_config_err(p, "outside [0, 1]");
    }

    #[test]
    fn rejects_missing_designated_table() {
        let mut p = parts();
        p.conversion_tables.retain(|t| t.field != "PersonalField9");
        expect_config_err(p, "PersonalField9");
    }

    #[test]
    fn rejects_unknown_binary_field() {
        let mut p = parts();
        p.binary_features.push("NoSuchField".into());
        expect_config_err(p, "NoSuchField");
    }

    #[test]
    fn rejects_constant_field_in_pairs() {
        let mut p = parts();
        p.feature_pairs.extend(["PropertyField6".into(), "Field7".into()]);
        expect_config_err(p, "PropertyField6");
    }

    #[test]
    fn rejects_duplicate_encoder_field() {
        let mut p = parts();
        let dup = p.encoders[0].clone();
        p.encoders.push(dup);
        expect_config_err(p, "two encoders");
    }

    #[test]
    fn rejects_empty_schema() {
        let mut p = parts();
        p.input_columns.clear();
        expect_config_err(p, "no columns");
    }

    #[test]
    fn conversion_lookup_falls_back_to_default() {
        let table = &parts().conversion_tables[0];
        assert_eq!(table.rate(&Value::Int(5)), 0.11);
        assert_eq!(table.rate(&Value::Float(5.0)), 0.11);
        assert_eq!(table.rate(&Value::Int(42)), table.default);
    }

    #[test]
    fn load_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = fixtures::write_artifacts(dir.path()).unwrap();
        let bundle = ArtifactBundle::load(&artifacts, &PipelineConfig::default()).unwrap();
        assert_eq!(bundle.feature_schema().len(), fixtures::FEATURE_COUNT);
    }

    #[test]
    fn load_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = fixtures::write_artifacts(dir.path()).unwrap();
        std::fs::remove_file(artifacts.resolve(&artifacts.feature_pairs)).unwrap();
        let err = ArtifactBundle::load(&artifacts, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, QuoteLensError::Configuration { ref reason } if reason.contains("failed to read")));
    }

    #[test]
    fn load_fails_on_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = fixtures::write_artifacts(dir.path()).unwrap();
        std::fs::write(artifacts.resolve(&artifacts.encoders), "{not json").unwrap();
        let err = ArtifactBundle::load(&artifacts, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, QuoteLensError::Configuration { ref reason } if reason.contains("failed to parse")));
    }
}
