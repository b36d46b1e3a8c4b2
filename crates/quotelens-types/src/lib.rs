//! # quotelens-types
//!
//! Core type definitions for the quotelens scoring service.
//!
//! This crate is the foundation of the dependency graph -- all other
//! quotelens crates depend on it. It contains:
//!
//! - **[`error`]** -- [`QuoteLensError`], the configuration / schema /
//!   validation error taxonomy
//! - **[`config`]** -- Configuration schema (artifacts, pipeline, inference, server)
//! - **[`value`]** -- A single typed tabular cell
//! - **[`record`]** -- One raw input row
//! - **[`feature`]** -- The ordered feature schema and feature vectors
//! - **[`prediction`]** -- Classifier output surfaced to callers

pub mod config;
pub mod error;
pub mod feature;
pub mod prediction;
pub mod record;
pub mod value;

pub use error::{QuoteLensError, Result};
pub use feature::{FeatureField, FeatureKind, FeatureSchema, FeatureVector};
pub use prediction::Prediction;
pub use record::RawRecord;
pub use value::Value;
