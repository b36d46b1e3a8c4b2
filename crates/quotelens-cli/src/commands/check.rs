//! `qlens check` -- load and validate the artifact bundle and model.
//!
//! Exits non-zero on the first configuration error, so the command doubles
//! as a deployment preflight.
//!
//! # Example
//!
//! ```text
//! qlens check --config demos/quotelens.json
//! qlens check --columns
//! ```

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};

use quotelens_core::InferenceService;
use quotelens_types::FeatureKind;

use super::{load_config, load_service};

/// Arguments for the `qlens check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Also list every output column in order.
    #[arg(long)]
    pub columns: bool,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let (_, source) = load_config(args.config.as_deref())?;
    let (config, service) = load_service(args.config.as_deref())?;

    match source {
        Some(path) => println!("Config:     {}", path.display()),
        None => println!("Config:     defaults"),
    }
    println!("Artifacts:  {}", config.artifacts.dir.display());
    println!("Classifier: {}", service.classifier().describe());
    println!("Threshold:  {}", service.config().threshold);
    println!();
    println!("{}", summary_table(&service));
    if args.columns {
        println!("{}", column_table(&service));
    }
    println!("bundle OK");
    Ok(())
}

fn summary_table(service: &InferenceService) -> Table {
    let bundle = service.bundle();
    let schema = bundle.feature_schema();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["ARTIFACT", "COUNT"]);
    let rows = [
        ("input columns", bundle.input_columns().len()),
        ("passthrough columns", schema.count_of(FeatureKind::Passthrough)),
        ("conversion-rate features", schema.count_of(FeatureKind::ConversionRate)),
        ("encoders", bundle.encoders().len()),
        ("indicator columns", schema.count_of(FeatureKind::Indicator)),
        ("binary fields", bundle.binary_features().len()),
        ("field pairs", bundle.feature_pairs().len()),
        ("output features", schema.len()),
    ];
    for (name, count) in rows {
        table.add_row([name.to_string(), count.to_string()]);
    }
    table
}

fn column_table(service: &InferenceService) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["#", "COLUMN", "KIND"]);
    for (i, field) in service.bundle().feature_schema().fields().iter().enumerate() {
        table.add_row([i.to_string(), field.name.clone(), format!("{:?}", field.kind)]);
    }
    table
}
