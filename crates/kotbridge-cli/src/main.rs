//! kotbridge CLI tool.
//!
//! Usage:
//! ```bash
//! kotbridge extract [OPTIONS]
//! kotbridge decode <ENCODED>
//! kotbridge init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Captures Kotlin source blocks and extracts them into standalone fragments
#[derive(Parser)]
#[command(name = "kotbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KOTBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture blocks and declarations, writing fragments if configured
    Extract {
        /// Project root (default: current directory)
        #[arg(short, long)]
        project_dir: Option<PathBuf>,

        /// Directory to write generated fragments to
        #[arg(short = 'o', long)]
        extracted_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Decode an encoded source location
    Decode {
        /// Encoded location; `\n` escapes are accepted in place of newlines
        encoded: String,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-capture compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            project_dir,
            extracted_dir,
            format,
            exclude,
        } => commands::extract::run(
            &commands::extract::ExtractArgs {
                project_dir,
                extracted_dir,
                exclude,
            },
            format,
            cli.config.as_deref(),
        ),
        Commands::Decode { encoded } => commands::decode::run(&encoded),
        Commands::Init { force } => commands::init::run(Path::new("."), force),
    }
}
