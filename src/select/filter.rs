//! Candidate selection: staged allowlist and exclusion denylist.
//!
//! ```text
//! glob results ──► staged? ──► excluded? ──► candidates
//!                  (skipped     (skipped when overridden
//!                  when         or no patterns configured)
//!                  overridden)
//! ```
//!
//! An overridden stage is loaded as `None` and passes every path, so the
//! four override combinations collapse into the two optional checks.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::ResourceError;
use super::pathset::{self, PathSet};
use crate::config::RunConfig;
use crate::sink::Workspace;

/// Loaded filter stages for one run.
#[derive(Debug, Default)]
pub struct Filters {
    /// Staged allowlist; `None` when staged filtering is overridden.
    staged: Option<PathSet>,
    /// Exclusion pattern; `None` when overridden or no patterns are configured.
    exclusions: Option<Regex>,
}

impl Filters {
    pub fn new(staged: Option<PathSet>, exclusions: Option<Regex>) -> Self {
        Self { staged, exclusions }
    }

    /// Load the stages that are not overridden from the workspace.
    ///
    /// A missing input file is fatal only for a stage that is active.
    pub fn load(workspace: &Workspace, config: &RunConfig) -> Result<Self, ResourceError> {
        let staged = if config.override_staged_files {
            None
        } else {
            let path = workspace.staged_files();
            Some(PathSet::read(&path).map_err(|err| missing(path, err))?)
        };

        let exclusions = if config.override_excluded_files {
            None
        } else {
            let path = workspace.exclusions();
            let content = std::fs::read_to_string(&path).map_err(|err| missing(path, err))?;
            compile_exclusions(&content)?
        };

        Ok(Self::new(staged, exclusions))
    }

    /// The staged allowlist, if it takes part in filtering.
    pub fn staged(&self) -> Option<&PathSet> {
        self.staged.as_ref()
    }

    /// Filter glob results down to the run's candidates, preserving order.
    pub fn select(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        files
            .iter()
            .filter(|path| self.accepts(path))
            .cloned()
            .collect()
    }

    /// Keep only staged paths; identity when staged filtering is overridden.
    pub fn restrict_to_staged(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
        match &self.staged {
            Some(staged) => staged.retain_members(&files),
            None => files,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        let staged = self.staged.as_ref().is_none_or(|s| s.contains(path));
        staged
            && self
                .exclusions
                .as_ref()
                .is_none_or(|re| !pathset::matches(re, path))
    }
}

/// Compile exclusion lines into one alternation.
///
/// Only the ends of the file are trimmed: spaces inside a line are part of
/// its pattern. Returns `None` when the file holds no patterns.
pub fn compile_exclusions(content: &str) -> Result<Option<Regex>, ResourceError> {
    let lines: Vec<&str> = content
        .trim()
        .lines()
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Ok(None);
    }

    Regex::new(&lines.join("|"))
        .map(Some)
        .map_err(ResourceError::Exclusions)
}

fn missing(path: PathBuf, source: io::Error) -> ResourceError {
    ResourceError::Missing { path, source }
}
