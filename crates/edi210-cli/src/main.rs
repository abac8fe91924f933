//! # edi210-cli
//!
//! Command-line interface for the EDI 210 golden-invoice engine.
//!
//! `parse` loads a profile directory, runs the full pipeline over an EDI
//! file, and prints the JSON report. `validate` checks an existing
//! golden-invoice JSON document against the v0.1 schema.

use std::sync::Arc;

use clap::Parser;
use serde_json::Value;

use edi210_extract::ExtractionContext;
use edi210_pipeline::Edi210Pipeline;
use edi210_profile::ProfileLoader;
use edi210_validation::GoldenValidator;

#[derive(Parser)]
#[command(name = "edi210")]
#[command(about = "EDI 210 golden-invoice parser")]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Parse an EDI 210 file into golden invoices
    Parse {
        /// Input EDI file path
        input: String,

        /// Profiles directory
        #[arg(short, long, default_value = "profiles")]
        profiles: String,

        /// Organization id driving buy/sell side determination
        #[arg(long, default_value = "OURBROKER")]
        org_id: String,

        /// Parser version stamped into record metadata
        #[arg(long, default_value = "1.0.0")]
        parser_version: String,

        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Validate golden-invoice JSON against the v0.1 schema
    Validate {
        /// Input JSON file (a single record or an array of records)
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            profiles,
            org_id,
            parser_version,
            compact,
        } => {
            tracing::info!("Parsing {} with profiles from {}", input, profiles);
            let registry = ProfileLoader::new(&profiles).load()?;
            let context = ExtractionContext {
                our_org_id: org_id,
                parser_version,
            };
            let pipeline = Edi210Pipeline::new(Arc::new(registry), context);

            let text = std::fs::read_to_string(&input)?;
            let report = pipeline.parse(&text)?;

            let payload = serde_json::json!({
                "results": report.results,
                "warnings": report.warnings(),
            });
            print_json(&payload, compact)?;

            if !report.all_valid() {
                tracing::warn!("one or more records failed schema validation");
            }
        }
        Commands::Validate { input } => {
            tracing::info!("Validating {}", input);
            let text = std::fs::read_to_string(&input)?;
            let value: Value = serde_json::from_str(&text)?;
            let records = match value {
                Value::Array(items) => items,
                single => vec![single],
            };

            let outcomes = GoldenValidator::new().validate_all(&records);
            print_json(&serde_json::to_value(&outcomes)?, false)?;

            if outcomes.iter().any(|o| !o.is_valid) {
                anyhow::bail!("validation failed");
            }
        }
    }

    Ok(())
}

fn print_json(value: &Value, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
