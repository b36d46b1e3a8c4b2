//! # quotelens-core
//!
//! Core engine for the quotelens scoring service.
//!
//! Contains the read-only artifact bundle, CSV ingest, the 10-step
//! feature pipeline, the tree-ensemble classifier and the inference
//! service that ties them together.

pub mod artifacts;
pub mod config_loader;
pub mod inference;
pub mod ingest;
pub mod model;
pub mod pipeline;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use artifacts::ArtifactBundle;
pub use inference::InferenceService;
pub use pipeline::FeaturePipeline;
