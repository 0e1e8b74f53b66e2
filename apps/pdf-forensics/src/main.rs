//! PDF forgery verdict CLI
//!
//! Analyses one PDF and prints the forensic report as JSON on stdout.
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use forensic_engine::{Config, LopdfProbe, NatureMode};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: pdf-forensics [OPTIONS] <PDF>";

#[derive(Parser, Debug)]
#[command(name = "pdf-forensics")]
#[command(
    version,
    about = "Detect falsified PDF documents from revisions, metadata and re-scan artifacts"
)]
struct Args {
    /// PDF file to analyse
    pdf: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document nature: scan, native or auto
    #[arg(short, long)]
    nature: Option<NatureMode>,

    /// Include per-signal evidence in the report
    #[arg(long)]
    evidence: bool,

    /// Print the raw document information dictionary and exit
    #[arg(long)]
    dump_metadata: bool,

    /// Revision inspection program
    #[arg(long)]
    revision_tool: Option<String>,

    /// Revision tool timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Args {
    /// Configuration file (or defaults) with command-line overrides applied
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(nature) = self.nature {
            config.document.nature = nature;
        }
        if let Some(tool) = &self.revision_tool {
            config.revision.tool = tool.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.revision.timeout_ms = timeout_ms;
        }
        Ok(config)
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

fn print_error(message: &str) {
    print_json(&serde_json::json!({ "error": message }));
}

fn dump_metadata(args: &Args) -> Result<()> {
    let info = LopdfProbe::new(&args.pdf)
        .info()
        .with_context(|| format!("reading metadata of {}", args.pdf.display()))?;
    print_json(&serde_json::to_value(info)?);
    Ok(())
}

fn analyze(args: &Args, config: &Config) -> Result<()> {
    tracing::info!("Analysing {}", args.pdf.display());
    let outcome = forensic_engine::analyze_file(&args.pdf, config, args.evidence);
    tracing::info!(
        "Finished with {} ({:?})",
        outcome.report.overall.verdict(),
        outcome.state
    );
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("{}", err);
                print_error(USAGE);
                return ExitCode::from(2);
            }
        },
    };

    // stdout carries the report, so logs must go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {:#}", err);
            print_error(&format!("{:#}", err));
            return ExitCode::from(2);
        }
    };

    let result = if args.dump_metadata {
        dump_metadata(&args)
    } else {
        analyze(&args, &config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
