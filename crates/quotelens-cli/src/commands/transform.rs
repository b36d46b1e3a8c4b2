//! `qlens transform` -- print feature vectors for debugging.
//!
//! Each row becomes one JSON object mapping output column to value, with
//! keys in Feature Schema order.

use std::path::PathBuf;

use clap::Args;
use serde_json::{Map, Value};

use quotelens_types::FeatureVector;

use super::{load_service, read_input};

/// Arguments for the `qlens transform` subcommand.
#[derive(Args)]
pub struct TransformArgs {
    /// CSV file with a header row and one quote per line.
    pub input: PathBuf,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run the transform command.
pub fn run(args: TransformArgs) -> anyhow::Result<()> {
    let (_, service) = load_service(args.config.as_deref())?;
    let bytes = read_input(&args.input)?;
    let vectors = service.transform_csv(&bytes)?;
    let rows: Vec<Value> = vectors.iter().map(as_object).collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Column -> value object.
fn as_object(vector: &FeatureVector) -> Value {
    let mut map = Map::with_capacity(vector.len());
    for (name, value) in vector.schema().names().zip(vector.values()) {
        map.insert(name.to_string(), Value::from(*value));
    }
    Value::Object(map)
}
