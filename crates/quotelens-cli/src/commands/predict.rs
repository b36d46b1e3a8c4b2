//! `qlens predict` -- score a CSV file offline.
//!
//! # Example
//!
//! ```text
//! qlens predict demos/sample.csv
//! qlens predict demos/sample.csv --json
//! ```

use std::path::PathBuf;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};

use quotelens_types::Prediction;

use super::{load_service, read_input};

/// Arguments for the `qlens predict` subcommand.
#[derive(Args)]
pub struct PredictArgs {
    /// CSV file with a header row and one quote per line.
    pub input: PathBuf,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Emit predictions as a JSON array instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Run the predict command.
pub fn run(args: PredictArgs) -> anyhow::Result<()> {
    let (_, service) = load_service(args.config.as_deref())?;
    let bytes = read_input(&args.input)?;
    let predictions = service.predict_csv(&bytes)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
    } else {
        println!("{}", prediction_table(&predictions));
    }
    Ok(())
}

fn prediction_table(predictions: &[Prediction]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["QUOTE", "LABEL", "PROBABILITY", "VERDICT"]);
    for p in predictions {
        table.add_row([
            p.quote_number.clone().unwrap_or_else(|| "-".into()),
            p.label.to_string(),
            format!("{:.4}", p.probability),
            p.verdict.clone(),
        ]);
    }
    table
}
