//! Extract command implementation.

use anyhow::{Context, Result};
use kotbridge::{Config, ExtractError};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigResolver;
use crate::OutputFormat;

/// Flags that override the configuration file.
#[derive(Debug, Default)]
pub struct ExtractArgs {
    /// Project root.
    pub project_dir: Option<PathBuf>,
    /// Fragment output directory.
    pub extracted_dir: Option<PathBuf>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the extract command.
pub fn run(args: &ExtractArgs, format: OutputFormat, explicit: Option<&Path>) -> Result<()> {
    let config = build_config(args, explicit)?;

    let report = match kotbridge::extract_with_config(config) {
        Ok(report) => report,
        Err(ExtractError::Capture(error)) => {
            eprintln!("{:?}", miette::Report::new(error));
            std::process::exit(1);
        }
        Err(error) => return Err(error).context("Extraction failed"),
    };

    super::output::print(&report, format)
}

/// Resolves and loads the configuration, then applies `args` on top.
fn build_config(args: &ExtractArgs, explicit: Option<&Path>) -> Result<Config> {
    let root = args
        .project_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = ConfigResolver::from_env().resolve(&root, explicit).load()?;

    let extraction = &mut config.extraction;
    if args.project_dir.is_some() {
        extraction.project_dir = root;
    } else if extraction.project_dir.is_relative() {
        extraction.project_dir = root.join(&extraction.project_dir);
    }
    if let Some(dir) = &args.extracted_dir {
        extraction.extracted_dir = Some(dir.clone());
    }
    extraction.exclude.extend(args.exclude.iter().cloned());

    Ok(config)
}
