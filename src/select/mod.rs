//! Candidate selection.
//!
//! # Modules
//!
//! - [`pathset`]: path sets with membership and regex matching
//! - [`filter`]: staged allowlist + exclusion denylist over glob results

pub mod filter;
pub mod pathset;

pub use filter::Filters;
pub use pathset::PathSet;

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading the run's selection inputs. All of them abort the run.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("cannot read `{}`", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid exclusion pattern")]
    Exclusions(#[source] regex::Error),

    #[error("invalid glob pattern `{0}`")]
    Pattern(String, #[source] glob::PatternError),
}
