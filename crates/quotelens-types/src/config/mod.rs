//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`, and every section falls back to defaults so an
//! empty `{}` config reproduces the stock deployment. Unknown fields are
//! silently ignored for forward compatibility.
//!
//! # Module Structure
//!
//! - [`pipeline`] -- Field names and constants driving the feature pipeline

pub mod pipeline;

pub use pipeline::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for quotelens.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where the artifact bundle lives.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Feature pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Decision threshold and verdict wording.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

// ── Artifacts ────────────────────────────────────────────────────────────

/// Locations of the artifact files.
///
/// File names are resolved relative to [`ArtifactsConfig::dir`] unless
/// they are absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the artifact files.
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,

    /// Ordered raw input columns (training schema minus the label).
    #[serde(default = "default_schema_file")]
    pub schema: String,

    /// Conversion-rate tables.
    #[serde(default = "default_conversion_rates_file", alias = "conversionRates")]
    pub conversion_rates: String,

    /// Fitted one-hot encoders.
    #[serde(default = "default_encoders_file")]
    pub encoders: String,

    /// Binary field names.
    #[serde(default = "default_binary_features_file", alias = "binaryFeatures")]
    pub binary_features: String,

    /// Field-name pairs for the equality count.
    #[serde(default = "default_feature_pairs_file", alias = "featurePairs")]
    pub feature_pairs: String,

    /// Trained classifier.
    #[serde(default = "default_model_file")]
    pub model: String,
}

impl ArtifactsConfig {
    /// Resolve an artifact file name against [`ArtifactsConfig::dir`].
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        if path.is_absolute() {
            path
        } else {
            self.dir.join(path)
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}
fn default_schema_file() -> String {
    "schema.json".into()
}
fn default_conversion_rates_file() -> String {
    "conversion_rates.json".into()
}
fn default_encoders_file() -> String {
    "cat_encoders.json".into()
}
fn default_binary_features_file() -> String {
    "binary_features.json".into()
}
fn default_feature_pairs_file() -> String {
    "feature_pairs.json".into()
}
fn default_model_file() -> String {
    "model.json".into()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            schema: default_schema_file(),
            conversion_rates: default_conversion_rates_file(),
            encoders: default_encoders_file(),
            binary_features: default_binary_features_file(),
            feature_pairs: default_feature_pairs_file(),
            model: default_model_file(),
        }
    }
}

// ── Inference ────────────────────────────────────────────────────────────

/// How classifier probabilities become labels and verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Probability strictly above which the positive label (1) is emitted.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Verdict shown for label 1.
    #[serde(default = "default_positive_label", alias = "positiveLabel")]
    pub positive_label: String,

    /// Verdict shown for label 0.
    #[serde(default = "default_negative_label", alias = "negativeLabel")]
    pub negative_label: String,
}

impl InferenceConfig {
    /// Verdict text for a label.
    pub fn verdict(&self, label: u8) -> &str {
        if label == 1 {
            &self.positive_label
        } else {
            &self.negative_label
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}
fn default_positive_label() -> String {
    "Churned: this customer is likely to purchase the quoted insurance plan.".into()
}
fn default_negative_label() -> String {
    "Not churned: this customer might not purchase the quoted insurance plan.".into()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            positive_label: default_positive_label(),
            negative_label: default_negative_label(),
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes", alias = "maxUploadBytes")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins; empty means permissive.
    #[serde(default, alias = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.artifacts.dir, PathBuf::from("artifacts"));
        assert_eq!(cfg.artifacts.model, "model.json");
        assert_eq!(cfg.server.port, 5000);
        assert!((cfg.inference.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.pipeline.sentinel, -1);
    }

    #[test]
    fn camel_case_aliases() {
        let json = r#"{
            "artifacts": { "conversionRates": "cr.json", "featurePairs": "pairs.json" },
            "inference": { "positiveLabel": "yes", "negativeLabel": "no" },
            "server": { "maxUploadBytes": 1024, "corsOrigins": ["http://localhost"] }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.artifacts.conversion_rates, "cr.json");
        assert_eq!(cfg.artifacts.feature_pairs, "pairs.json");
        assert_eq!(cfg.inference.verdict(1), "yes");
        assert_eq!(cfg.inference.verdict(0), "no");
        assert_eq!(cfg.server.max_upload_bytes, 1024);
        assert_eq!(cfg.server.cors_origins.len(), 1);
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let cfg = ArtifactsConfig {
            dir: PathBuf::from("/srv/bundle"),
            ..Default::default()
        };
        assert_eq!(cfg.resolve("model.json"), PathBuf::from("/srv/bundle/model.json"));
        assert_eq!(cfg.resolve("/etc/model.json"), PathBuf::from("/etc/model.json"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg: Config = serde_json::from_str(r#"{"server": {"port": 8080, "tls": true}}"#).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }
}
