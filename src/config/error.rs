//! Errors raised while building the run configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config file")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),
}
