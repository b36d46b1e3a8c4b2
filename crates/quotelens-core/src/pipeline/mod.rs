//! 10-step feature pipeline.
//!
//! Steps: missing count -> null fill -> constant drop -> normalization ->
//! date decomposition -> binary counts -> pair equality -> conversion
//! rates -> identifier drop -> one-hot encoding
//!
//! The order is load-bearing: later steps read cells rewritten by earlier
//! ones (the fill feeds the pair comparison, the remap feeds the encoder).
//! A [`FeaturePipeline`] only borrows the [`ArtifactBundle`]; it carries no
//! state between records.

pub mod dates;
pub mod schema;
pub mod steps;

use rayon::prelude::*;
use tracing::{debug, trace};

use quotelens_types::{FeatureVector, QuoteLensError, RawRecord, Result, Value};

use crate::artifacts::ArtifactBundle;

use self::dates::DateParts;

/// Transforms raw records into classifier-ready feature vectors.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePipeline<'a> {
    bundle: &'a ArtifactBundle,
}

impl<'a> FeaturePipeline<'a> {
    /// Create a pipeline over a loaded bundle.
    pub fn new(bundle: &'a ArtifactBundle) -> Self {
        Self { bundle }
    }

    /// The bundle this pipeline reads.
    pub fn bundle(&self) -> &'a ArtifactBundle {
        self.bundle
    }

    /// Transform one record.
    ///
    /// Fails without producing a partial vector on the first schema,
    /// validation or configuration error.
    pub fn transform(&self, record: &RawRecord) -> Result<FeatureVector> {
        let bundle = self.bundle;
        let config = bundle.pipeline_config();
        let mut rec = record.clone();

        // 1. missing-value accounting
        let missing = steps::count_missing(&rec, config.sentinel);

        // 2. null fill
        steps::fill_nulls(&mut rec, config)?;

        // 3. constant-column drop
        steps::drop_constant(&mut rec, config);

        // 4. validation / normalization
        let date = dates::parse_date(
            &config.date_field,
            rec.get(&config.date_field)?,
            &config.date_format,
        )?;
        steps::strip_thousands(&mut rec, config)?;
        steps::apply_remaps(&mut rec, config)?;

        // 5. date decomposition
        let date_parts = DateParts::from(date);
        rec.remove(&config.date_field);

        // 6. affirmation / negation counts
        let (negations, affirmations) = steps::count_binary(&rec, bundle.binary_features())?;

        // 7. pairwise equality
        let same = steps::count_equal_pairs(&rec, bundle.feature_pairs(), config.sentinel)?;

        // 8. conversion rates
        let rates =
            steps::lookup_rates(&rec, &config.conversion_fields, bundle.conversion_tables())?;

        // 9. identifier removal
        rec.remove(&config.id_field);

        debug!(
            missing,
            negations,
            affirmations,
            same,
            year = date_parts.year,
            "derived features"
        );

        // 10. assemble in schema order, encoding categoricals last
        let schema = bundle.feature_schema();
        let mut values = Vec::with_capacity(schema.len());
        for field in bundle.passthrough_columns() {
            values.push(numeric(field, rec.get(field)?)?);
        }
        values.push(missing as f64);
        values.extend(date_parts.as_features());
        values.push(negations as f64);
        values.push(affirmations as f64);
        values.push(same as f64);
        values.extend(rates);
        for encoder in bundle.encoders() {
            encoder.encode_into(rec.get(encoder.field())?, &mut values)?;
        }
        trace!(columns = values.len(), "feature vector assembled");

        let width = values.len();
        FeatureVector::new(schema.clone(), values).ok_or_else(|| {
            QuoteLensError::configuration(format!(
                "assembled {width} values for a {}-column schema",
                schema.len()
            ))
        })
    }

    /// Transform many records in parallel, preserving input order.
    ///
    /// Each record succeeds or fails on its own.
    pub fn transform_batch(&self, records: &[RawRecord]) -> Vec<Result<FeatureVector>> {
        records.par_iter().map(|r| self.transform(r)).collect()
    }
}

/// Numeric value of a passthrough cell.
fn numeric(field: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        QuoteLensError::validation(field, format!("expected a numeric value, got {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use quotelens_types::FeatureKind;

    fn run(record: &RawRecord) -> Result<FeatureVector> {
        let bundle = fixtures::bundle();
        FeaturePipeline::new(&bundle).transform(record)
    }

    #[test]
    fn clean_record_has_zero_missing_count() {
        let v = run(&fixtures::record()).unwrap();
        assert_eq!(v.get(schema::MISSING_VALUE_COUNT), Some(0.0));
        assert_eq!(v.len(), fixtures::FEATURE_COUNT);
    }

    #[test]
    fn nulls_and_sentinels_are_counted() {
        let mut rec = fixtures::record();
        rec.insert("Field7", Value::Null);
        rec.insert("CoverageField2A", Value::Int(-1));
        rec.insert("PersonalField84", Value::Null);
        let v = run(&rec).unwrap();
        assert_eq!(v.get(schema::MISSING_VALUE_COUNT), Some(3.0));
        // Filled with the sentinel before reaching the vector.
        assert_eq!(v.get("Field7"), Some(-1.0));
        assert_eq!(v.get("PersonalField84"), Some(-1.0));
    }

    #[test]
    fn date_is_decomposed_and_dropped() {
        let v = run(&fixtures::record()).unwrap();
        assert_eq!(v.values_of(FeatureKind::Date), vec![2023.0, 3.0, 7.0, 15.0, 5.0]);
        assert!(v.schema().position("Original_Quote_Date").is_none());
    }

    #[test]
    fn malformed_date_fails_without_vector() {
        let mut rec = fixtures::record();
        rec.insert("Original_Quote_Date", Value::from("15-07-2023"));
        let err = run(&rec).unwrap_err();
        assert!(matches!(err, QuoteLensError::Validation { ref field, .. } if field == "Original_Quote_Date"));
    }

    #[test]
    fn binary_counts_follow_configured_fields() {
        // Fixture binary fields hold ["Y", "N", "Y", 0, 1].
        let v = run(&fixtures::record()).unwrap();
        assert_eq!(v.get(schema::AFFIRMATION_COUNT), Some(3.0));
        assert_eq!(v.get(schema::NEGATION_COUNT), Some(2.0));
    }

    #[test]
    fn pair_equality_counts_per_record() {
        let v = run(&fixtures::record()).unwrap();
        assert_eq!(v.get(schema::SAME_VALUE_COUNT), Some(1.0));

        let mut rec = fixtures::record();
        rec.insert("CoverageField2A", Value::Int(-1));
        rec.insert("CoverageField2B", Value::Int(-1));
        let v = run(&rec).unwrap();
        assert_eq!(v.get(schema::SAME_VALUE_COUNT), Some(1.0));

        rec.insert("CoverageField2A", Value::Int(4));
        rec.insert("CoverageField2B", Value::Int(4));
        let v = run(&rec).unwrap();
        assert_eq!(v.get(schema::SAME_VALUE_COUNT), Some(2.0));
    }

    #[test]
    fn unseen_conversion_value_uses_default() {
        let mut rec = fixtures::record();
        rec.insert("SalesField5", Value::Int(99));
        rec.insert("PersonalField9", Value::Int(99));
        let v = run(&rec).unwrap();
        assert_eq!(v.get("FE_salesField5"), Some(fixtures::DEFAULT_SF5_RATE));
        assert_eq!(v.get("FE_pesonalField9"), Some(fixtures::DEFAULT_PF9_RATE));
        assert_eq!(v.get("FE_salesField1B"), Some(0.4));
    }

    #[test]
    fn unseen_category_yields_zero_block() {
        let mut rec = fixtures::record();
        rec.insert("Field6", Value::from("ZZ"));
        let v = run(&rec).unwrap();
        for col in ["Field6_A", "Field6_B", "Field6_C"] {
            assert_eq!(v.get(col), Some(0.0), "{col}");
        }
    }

    #[test]
    fn blank_category_is_remapped_before_encoding() {
        let mut rec = fixtures::record();
        rec.insert("GeographicField63", Value::from(" "));
        let v = run(&rec).unwrap();
        assert_eq!(v.get("GeographicField63_N"), Some(1.0));
        assert_eq!(v.get("GeographicField63_Y"), Some(0.0));
    }

    #[test]
    fn thousands_separated_value_is_numeric() {
        let v = run(&fixtures::record()).unwrap();
        assert_eq!(v.get("Field10"), Some(1165.0));
    }

    #[test]
    fn identifier_and_categoricals_never_reach_the_vector() {
        let v = run(&fixtures::record()).unwrap();
        for col in ["QuoteNumber", "Field6", "GeographicField63", "PropertyField6"] {
            assert!(v.schema().position(col).is_none(), "{col}");
        }
    }

    #[test]
    fn missing_field_is_schema_error() {
        let mut rec = fixtures::record();
        rec.remove("CoverageField1B");
        assert_eq!(run(&rec).unwrap_err().kind(), "schema");
    }

    #[test]
    fn text_in_numeric_column_is_validation_error() {
        let mut rec = fixtures::record();
        rec.insert("Field7", Value::from("lots"));
        let err = run(&rec).unwrap_err();
        assert!(matches!(err, QuoteLensError::Validation { ref field, .. } if field == "Field7"));
    }

    #[test]
    fn transform_is_deterministic() {
        let bundle = fixtures::bundle();
        let pipeline = FeaturePipeline::new(&bundle);
        let rec = fixtures::record();
        let a = pipeline.transform(&rec).unwrap();
        let b = pipeline.transform(&rec).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn batch_results_do_not_leak_between_records() {
        let bundle = fixtures::bundle();
        let pipeline = FeaturePipeline::new(&bundle);

        let mut noisy = fixtures::record();
        noisy.insert("Field7", Value::Int(-1));
        noisy.insert("CoverageField1A", Value::Null);
        let mut bad = fixtures::record();
        bad.insert("Original_Quote_Date", Value::from("not a date"));

        let results = pipeline.transform_batch(&[noisy, fixtures::record(), bad]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().get(schema::MISSING_VALUE_COUNT), Some(2.0));
        assert_eq!(results[1].as_ref().unwrap().get(schema::MISSING_VALUE_COUNT), Some(0.0));
        assert!(results[2].is_err());

        let alone = pipeline.transform(&fixtures::record()).unwrap();
        assert_eq!(results[1].as_ref().unwrap().to_bytes(), alone.to_bytes());
    }
}
