//! Pre-trained binary classifier.
//!
//! The service only needs a positive-class probability for a feature
//! vector, so any model format that can produce one sits behind
//! [`Classifier`]. The shipped format is a JSON tree ensemble
//! ([`TreeEnsemble`]).

pub mod tree;

use std::path::Path;

use quotelens_types::{FeatureVector, Result};

pub use tree::{Node, Tree, TreeEnsemble};

/// A fitted binary classifier over the pipeline's feature vectors.
pub trait Classifier: Send + Sync {
    /// Column names the classifier was fitted on, in input order.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class (conversion) for one vector.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64>;

    /// Short human-readable description for logs and `check` output.
    fn describe(&self) -> String {
        format!("classifier over {} features", self.feature_names().len())
    }
}

/// Load the default classifier format from a JSON file.
pub fn load(path: &Path) -> Result<TreeEnsemble> {
    TreeEnsemble::load(path)
}
