//! Run configuration.
//!
//! Settings come from two layers, later layers winning:
//!
//! 1. `image-converter.toml` (optional, path set with `--config`)
//! 2. command-line flags
//!
//! # Example
//!
//! ```toml
//! image_glob = "assets/**/*.(jpg|jpeg|png|gif|bmp|tif|tiff|svg|webp)"
//! code_glob = "src/**/*.(vue|html|ts)"
//! workdir = ".image-converter-temp"
//! process_svg_files = false
//! override_staged_files = false
//! override_excluded_files = false
//! create_fallback_image = true
//! ```

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::log;
use crate::sink::DEFAULT_DIR;

/// Default config file name.
pub const CONFIG_FILE: &str = "image-converter.toml";

/// Settings as written in the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub image_glob: Option<String>,
    pub code_glob: Option<String>,
    pub workdir: Option<PathBuf>,
    pub process_svg_files: bool,
    pub override_staged_files: bool,
    pub override_excluded_files: bool,
    pub create_fallback_image: bool,
}

impl FileConfig {
    /// Parse TOML, warning about keys this version does not know.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;

        for key in &ignored {
            log!("config"; "unknown field `{}` ignored", key);
        }
        Ok(config)
    }

    /// Load `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(path.to_path_buf(), err)),
        }
    }
}

/// Immutable settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Glob selecting candidate images (also the sibling set).
    pub image_glob: String,
    /// Glob selecting code files that may reference converted images.
    pub code_glob: Option<String>,
    /// Workspace directory for input lists and result logs.
    pub workdir: PathBuf,
    pub process_svg_files: bool,
    pub override_staged_files: bool,
    pub override_excluded_files: bool,
    pub create_fallback_image: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_glob: String::new(),
            code_glob: None,
            workdir: PathBuf::from(DEFAULT_DIR),
            process_svg_files: false,
            override_staged_files: false,
            override_excluded_files: false,
            create_fallback_image: false,
        }
    }
}

impl RunConfig {
    /// Load the config file named by the CLI and apply CLI flags on top.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = FileConfig::load(&cli.config)?;
        Self::merge(file, cli)
    }

    /// Combine file settings with CLI flags. A flag given on the command line
    /// always enables its setting.
    pub fn merge(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let image_glob = cli
            .image_glob
            .clone()
            .or(file.image_glob)
            .filter(|glob| !glob.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "no image glob given (use --image-glob or `image_glob` in the config file)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            image_glob,
            code_glob: cli.code_glob.clone().or(file.code_glob),
            workdir: cli
                .workdir
                .clone()
                .or(file.workdir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
            process_svg_files: cli.process_svg_files || file.process_svg_files,
            override_staged_files: cli.override_staged_files || file.override_staged_files,
            override_excluded_files: cli.override_excluded_files || file.override_excluded_files,
            create_fallback_image: cli.create_fallback_image || file.create_fallback_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("image-converter").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_from_cli_only() {
        let config = RunConfig::merge(FileConfig::default(), &cli(&["-i", "img/*.png"])).unwrap();
        assert_eq!(config.image_glob, "img/*.png");
        assert_eq!(config.code_glob, None);
        assert_eq!(config.workdir, PathBuf::from(DEFAULT_DIR));
        assert!(!config.process_svg_files);
        assert!(!config.override_staged_files);
        assert!(!config.override_excluded_files);
        assert!(!config.create_fallback_image);
    }

    #[test]
    fn test_cli_flags() {
        let config = RunConfig::merge(
            FileConfig::default(),
            &cli(&[
                "-i",
                "img/*.png",
                "-c",
                "src/**/*.vue",
                "--process-svg-files",
                "--override-staged-files",
                "--override-excluded-files",
                "--create-fallback-image",
                "-w",
                "tmp/work",
            ]),
        )
        .unwrap();

        assert_eq!(config.code_glob.as_deref(), Some("src/**/*.vue"));
        assert_eq!(config.workdir, PathBuf::from("tmp/work"));
        assert!(config.process_svg_files);
        assert!(config.override_staged_files);
        assert!(config.override_excluded_files);
        assert!(config.create_fallback_image);
    }

    #[test]
    fn test_file_supplies_defaults_cli_wins() {
        let file = FileConfig::parse(
            r#"
            image_glob = "assets/*.png"
            code_glob = "src/*.ts"
            create_fallback_image = true
            "#,
        )
        .unwrap();

        let config = RunConfig::merge(file.clone(), &cli(&[])).unwrap();
        assert_eq!(config.image_glob, "assets/*.png");
        assert_eq!(config.code_glob.as_deref(), Some("src/*.ts"));
        assert!(config.create_fallback_image);

        let config = RunConfig::merge(file, &cli(&["-i", "other/*.gif"])).unwrap();
        assert_eq!(config.image_glob, "other/*.gif");
    }

    #[test]
    fn test_missing_image_glob_is_rejected() {
        let err = RunConfig::merge(FileConfig::default(), &cli(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let file = FileConfig::parse("image_glob = \"a/*.png\"\nshiny = 1\n").unwrap();
        assert_eq!(file.image_glob.as_deref(), Some("a/*.png"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            FileConfig::parse("image_glob = "),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let file = FileConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(file, FileConfig::default());
    }
}
