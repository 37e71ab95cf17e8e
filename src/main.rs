//! image-converter - convert staged images to WebP for commit hooks.

mod cli;
mod config;
mod image;
mod logger;
mod policy;
mod select;
mod sink;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::RunConfig;
use sink::Workspace;
use utils::plural::plural_count;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = RunConfig::load(&cli)?;
    debug!("config"; "{:?}", config);

    let workspace = Workspace::new(&config.workdir);
    workspace
        .reset()
        .with_context(|| format!("failed to prepare workspace `{}`", workspace.root().display()))?;

    let report = cli::convert::run(&config)?;

    if report.converted > 0 || report.failed > 0 {
        log!(
            "done";
            "{} converted, {} skipped, {}",
            plural_count(report.converted, "image"),
            report.skipped,
            plural_count(report.failed, "error")
        );
    }

    Ok(())
}
