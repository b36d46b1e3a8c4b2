//! HTTP surface for quotelens.
//!
//! Serves the browser upload form, the HTML verdict page and a JSON
//! scoring API on top of a shared [`quotelens_core::InferenceService`].

pub mod api;

pub use api::{ApiState, build_router, serve};
