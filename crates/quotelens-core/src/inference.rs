//! Inference service.
//!
//! Pairs the artifact bundle with a classifier and turns raw records into
//! labelled predictions. The service is immutable after construction and
//! is shared across request handlers behind an `Arc`.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use quotelens_types::config::{Config, InferenceConfig};
use quotelens_types::{FeatureVector, Prediction, QuoteLensError, RawRecord, Result};

use crate::artifacts::ArtifactBundle;
use crate::ingest::{self, IngestSettings};
use crate::model::{self, Classifier};
use crate::pipeline::FeaturePipeline;

/// Scores raw records against a loaded bundle and classifier.
pub struct InferenceService {
    bundle: Arc<ArtifactBundle>,
    classifier: Arc<dyn Classifier>,
    config: InferenceConfig,
    ingest: IngestSettings,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("features", &self.bundle.feature_schema().len())
            .field("classifier", &self.classifier.describe())
            .field("threshold", &self.config.threshold)
            .finish()
    }
}

impl InferenceService {
    /// Assemble a service from already-loaded parts.
    ///
    /// The classifier must have been fitted on exactly the bundle's feature
    /// schema, in the same column order.
    pub fn new(
        bundle: Arc<ArtifactBundle>,
        classifier: Arc<dyn Classifier>,
        config: InferenceConfig,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(QuoteLensError::configuration(format!(
                "decision threshold {} outside [0, 1]",
                config.threshold
            )));
        }

        let expected: Vec<&str> = bundle.feature_schema().names().collect();
        let actual: Vec<&str> = classifier.feature_names().iter().map(String::as_str).collect();
        if expected != actual {
            let detail = match expected.iter().zip(&actual).position(|(a, b)| a != b) {
                Some(i) => format!(
                    "column {i} is '{}' in the feature schema but '{}' in the model",
                    expected[i], actual[i]
                ),
                None => format!(
                    "feature schema has {} columns, model has {}",
                    expected.len(),
                    actual.len()
                ),
            };
            return Err(QuoteLensError::configuration(format!(
                "model does not match the artifact bundle: {detail}"
            )));
        }

        let ingest = IngestSettings::from_bundle(&bundle);
        Ok(Self {
            bundle,
            classifier,
            config,
            ingest,
        })
    }

    /// Load the bundle and the classifier named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bundle = ArtifactBundle::load(&config.artifacts, &config.pipeline)?;
        let model_path = config.artifacts.resolve(&config.artifacts.model);
        let classifier = model::load(&model_path)?;
        let service = Self::new(
            Arc::new(bundle),
            Arc::new(classifier),
            config.inference.clone(),
        )?;
        info!(
            classifier = %service.classifier.describe(),
            threshold = service.config.threshold,
            "inference service ready"
        );
        Ok(service)
    }

    /// The shared artifact bundle.
    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Threshold and verdict settings.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Run the pipeline on one record without scoring it.
    pub fn transform(&self, record: &RawRecord) -> Result<FeatureVector> {
        FeaturePipeline::new(&self.bundle).transform(record)
    }

    /// Transform and score one record.
    pub fn predict(&self, record: &RawRecord) -> Result<Prediction> {
        let quote_number = record
            .try_get(&self.bundle.pipeline_config().id_field)
            .filter(|v| !v.is_null())
            .map(|v| v.lookup_key());

        let features = self.transform(record)?;
        let probability = self.classifier.predict_proba(&features)?;
        let label = u8::from(probability > self.config.threshold);
        debug!(quote = ?quote_number, probability, label, "record scored");

        Ok(Prediction {
            quote_number,
            label,
            probability,
            verdict: self.config.verdict(label).to_string(),
        })
    }

    /// Ingest an uploaded CSV and score every row.
    ///
    /// Rows are scored in parallel; the whole upload fails with the error
    /// of the first failing row, in file order.
    pub fn predict_csv(&self, bytes: &[u8]) -> Result<Vec<Prediction>> {
        let records = self.read(bytes)?;
        let results: Vec<Result<Prediction>> =
            records.par_iter().map(|r| self.predict(r)).collect();
        Self::first_error(results)
    }

    /// Ingest an uploaded CSV and transform every row.
    pub fn transform_csv(&self, bytes: &[u8]) -> Result<Vec<FeatureVector>> {
        let records = self.read(bytes)?;
        let results = FeaturePipeline::new(&self.bundle).transform_batch(&records);
        Self::first_error(results)
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<RawRecord>> {
        ingest::read_records(bytes, &self.ingest).inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "upload rejected");
        })
    }

    fn first_error<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(results.len());
        for (row, result) in results.into_iter().enumerate() {
            match result {
                Ok(v) => out.push(v),
                Err(e) => {
                    warn!(row, kind = e.kind(), error = %e, "record rejected");
                    return Err(e);
                }
            }
        }
        Ok(out)
    }
}
