use cbc_core::constants::OUTPUT_DIR_ENV;
use cbc_core::{process_directory, PlainTextSource, TextSource};
use cbc_ident::RandomIdGenerator;
use cbc_types::StructuredReport;
use clap::{Parser, Subcommand};
use fhir::BundleBuilder;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cbc")]
#[command(about = "CBC report processing pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every transcript in a directory
    Process {
        /// Directory containing report transcripts
        input_dir: PathBuf,
        /// Directory for records, bundles, and trends (default: CBC_OUTPUT_DIR)
        output_dir: Option<PathBuf>,
    },
    /// Parse one transcript and print the structured record
    Parse {
        /// Transcript file
        file: PathBuf,
    },
    /// Build a bundle document from a structured report record
    Bundle {
        /// Structured report record (JSON)
        record: PathBuf,
        /// Directory to write the bundle into
        output_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cbc_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input_dir,
            output_dir,
        } => {
            let output_dir = match output_dir {
                Some(dir) => dir,
                None => std::env::var(OUTPUT_DIR_ENV)
                    .map(PathBuf::from)
                    .map_err(|_| {
                        format!("no output directory given and {OUTPUT_DIR_ENV} is not set")
                    })?,
            };
            let summary = process_directory(&PlainTextSource, &input_dir, &output_dir)?;
            println!(
                "Processed {} document(s), skipped {}, failed {}",
                summary.processed, summary.skipped, summary.failed
            );
            if let Some(trends) = summary.trends {
                println!("Trend series: {}", trends.display());
            }
        }
        Commands::Parse { file } => {
            let text = PlainTextSource.extract_text(&file);
            let report = cbc_parser::parse(&text);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Bundle { record, output_dir } => {
            let contents = std::fs::read_to_string(&record)?;
            let report: StructuredReport = serde_json::from_str(&contents)?;
            let path = BundleBuilder::new(&RandomIdGenerator).write(&report, &output_dir)?;
            println!("Wrote bundle: {}", path.display());
        }
    }

    Ok(())
}
