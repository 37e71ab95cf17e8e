//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Convert staged images to WebP and record what changed for commit hooks
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Glob to search image files
    #[arg(short, long, value_name = "GLOB")]
    pub image_glob: Option<String>,

    /// Glob to search code files that may reference converted images
    #[arg(short, long, value_name = "GLOB")]
    pub code_glob: Option<String>,

    /// Process SVG files
    #[arg(long)]
    pub process_svg_files: bool,

    /// Don't exclude unstaged files
    #[arg(long)]
    pub override_staged_files: bool,

    /// Don't exclude files from the exclusions list
    #[arg(long)]
    pub override_excluded_files: bool,

    /// Create a PNG/GIF file if a JPEG, PNG, GIF, TIFF, SVG or BMP file doesn't exist
    #[arg(long)]
    pub create_fallback_image: bool,

    /// Workspace directory for staged/exclusion lists and result logs
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub workdir: Option<PathBuf>,

    /// Config file path
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
