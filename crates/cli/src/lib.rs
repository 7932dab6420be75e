pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use esim_catalog_core::config::LoadOptions;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "esim",
    about = "eSIM plan catalog operator CLI",
    long_about = "Inspect configuration, check catalog readiness, report plan statistics and coverage, and refresh the partner feed.",
    after_help = "Examples:\n  esim doctor --json\n  esim config\n  esim coverage\n  esim refresh"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an esim.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, local catalog readability, and partner feed freshness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Aggregate the catalog and print plan statistics as JSON")]
    Stats,
    #[command(about = "List countries and regions without any plan (exit code 3 when gaps exist)")]
    Coverage,
    #[command(about = "Fetch the partner plans feed now (exit code 4 when disabled or failing)")]
    Refresh,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };
    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Stats => commands::stats::run(&options),
        Command::Coverage => commands::coverage::run(&options),
        Command::Refresh => commands::refresh::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
