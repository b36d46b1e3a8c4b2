//! `qlens` -- CLI binary for the quotelens scoring service.
//!
//! Provides the following subcommands:
//!
//! - `qlens serve` -- Start the upload form and JSON API.
//! - `qlens predict` -- Score a CSV file offline.
//! - `qlens transform` -- Print the feature vectors of a CSV file.
//! - `qlens check` -- Load and validate the artifact bundle.
//! - `qlens config show` -- Print the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// quotelens quote-conversion scoring CLI.
#[derive(Parser)]
#[command(name = "qlens", about = "quotelens quote-conversion scoring CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve(commands::serve::ServeArgs),

    /// Score every row of a CSV file.
    Predict(commands::predict::PredictArgs),

    /// Print feature vectors for every row of a CSV file.
    Transform(commands::transform::TransformArgs),

    /// Load and validate the artifact bundle and model.
    Check(commands::check::CheckArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `qlens config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the full resolved configuration as JSON.
    Show {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Predict(args) => commands::predict::run(args)?,
        Commands::Transform(args) => commands::transform::run(args)?,
        Commands::Check(args) => commands::check::run(args)?,
        Commands::Config { action } => match action {
            ConfigCmd::Show { config } => {
                let (cfg, _) = commands::load_config(config.as_deref())?;
                commands::config_cmd::config_show(&cfg)?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_predict_with_json_flag() {
        let cli = Cli::try_parse_from(["qlens", "predict", "quotes.csv", "--json"]).unwrap();
        match cli.command {
            Commands::Predict(args) => {
                assert!(args.json);
                assert_eq!(args.input.to_str(), Some("quotes.csv"));
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["qlens", "check", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn serve_overrides_parse() {
        let cli =
            Cli::try_parse_from(["qlens", "serve", "--host", "0.0.0.0", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }
}
