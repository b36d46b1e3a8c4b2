//! Gradient-boosted tree ensemble.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "feature_names": ["Field7", "..."],
//!   "base_score": 0.0,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": "Field7", "threshold": 20.0, "left": 1, "right": 2, "default_left": true },
//!         { "leaf": -0.2 },
//!         { "leaf": 0.3 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. A sample goes left when `x < threshold`; a NaN
//! input follows `default_left`. The positive-class probability is
//! `sigmoid(base_score + sum of reached leaves)`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use quotelens_types::{FeatureVector, QuoteLensError, Result};

use super::Classifier;
use crate::artifacts::read_json;

/// One node of a flat tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

/// A single regression tree stored as a flat node array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Serialized ensemble, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnsembleFile {
    feature_names: Vec<String>,
    #[serde(default)]
    base_score: f64,
    trees: Vec<Tree>,
}

/// Split with its feature resolved to a column index.
#[derive(Debug, Clone, Copy)]
enum Compiled {
    Split {
        column: usize,
        threshold: f64,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f64),
}

/// A validated tree ensemble ready for scoring.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    base_score: f64,
    trees: Vec<Vec<Compiled>>,
}

impl TreeEnsemble {
    /// Read and validate a model file.
    pub fn load(path: &Path) -> Result<Self> {
        let file: EnsembleFile = read_json(path)?;
        let model = Self::build(file.feature_names, file.base_score, file.trees)?;
        info!(
            path = %path.display(),
            trees = model.trees.len(),
            features = model.feature_names.len(),
            "classifier loaded"
        );
        Ok(model)
    }

    /// Validate an in-memory ensemble.
    ///
    /// Every split must name a known feature and point at in-range children
    /// that come after it, which also rules out cycles.
    pub fn build(feature_names: Vec<String>, base_score: f64, trees: Vec<Tree>) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(QuoteLensError::configuration("model lists no feature names"));
        }
        if !base_score.is_finite() {
            return Err(QuoteLensError::configuration("model base_score is not finite"));
        }
        let columns: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        if columns.len() != feature_names.len() {
            return Err(QuoteLensError::configuration("model lists a feature name twice"));
        }

        let mut compiled = Vec::with_capacity(trees.len());
        for (t, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(QuoteLensError::configuration(format!("model tree {t} has no nodes")));
            }
            let mut nodes = Vec::with_capacity(tree.nodes.len());
            for (i, node) in tree.nodes.iter().enumerate() {
                let bad = |what: String| {
                    QuoteLensError::configuration(format!("model tree {t} node {i}: {what}"))
                };
                nodes.push(match node {
                    Node::Leaf { leaf } if leaf.is_finite() => Compiled::Leaf(*leaf),
                    Node::Leaf { leaf } => return Err(bad(format!("leaf value {leaf}"))),
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                        default_left,
                    } => {
                        let column = *columns
                            .get(feature.as_str())
                            .ok_or_else(|| bad(format!("unknown feature '{feature}'")))?;
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(bad(format!("child index {child} out of order")));
                            }
                        }
                        if threshold.is_nan() {
                            return Err(bad("threshold is NaN".into()));
                        }
                        Compiled::Split {
                            column,
                            threshold: *threshold,
                            left: *left,
                            right: *right,
                            default_left: *default_left,
                        }
                    }
                });
            }
            compiled.push(nodes);
        }

        Ok(Self {
            feature_names,
            base_score,
            trees: compiled,
        })
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw margin (log-odds) for a row of values in feature-name order.
    pub fn margin(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| walk(t, row)).sum::<f64>()
    }
}

fn walk(nodes: &[Compiled], row: &[f64]) -> f64 {
    let mut idx = 0;
    loop {
        match nodes[idx] {
            Compiled::Leaf(v) => return v,
            Compiled::Split {
                column,
                threshold,
                left,
                right,
                default_left,
            } => {
                let x = row[column];
                let go_left = if x.is_nan() { default_left } else { x < threshold };
                idx = if go_left { left } else { right };
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(QuoteLensError::configuration(format!(
                "model expects {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }
        Ok(sigmoid(self.margin(features.values())))
    }

    fn describe(&self) -> String {
        format!(
            "tree ensemble ({} trees over {} features)",
            self.trees.len(),
            self.feature_names.len()
        )
    }
}
