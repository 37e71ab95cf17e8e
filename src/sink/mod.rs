//! Result logs shared with downstream tooling.
//!
//! Every outcome of a run lands in the [`Workspace`] as line-delimited text.
//! The logs are the only state: nothing is aggregated in memory beyond the
//! counters the caller keeps for its summary.
//!
//! Appends are serialized per log. A converted pair is written to the
//! source and target logs under one lock so line `n` of both files always
//! describes the same conversion.

mod workspace;

pub use workspace::{DEFAULT_DIR, Workspace};

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::policy::Outcome;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Append-only, line-per-path log file.
#[derive(Debug)]
struct AppendLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AppendLog {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn append<'a>(&self, lines: impl IntoIterator<Item = &'a Path>) -> io::Result<()> {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(&line.to_string_lossy());
            buf.push_str(LINE_ENDING);
        }

        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf.as_bytes())
    }
}

/// Writes run outcomes into the workspace logs.
#[derive(Debug)]
pub struct ResultSink {
    marker: PathBuf,
    sources: AppendLog,
    targets: AppendLog,
    errors: AppendLog,
    code_search: AppendLog,
    /// Held across a source/target pair; `true` once the marker exists.
    converted: Mutex<bool>,
}

impl ResultSink {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            marker: workspace.conversion_marker(),
            sources: AppendLog::new(workspace.converted_sources()),
            targets: AppendLog::new(workspace.converted_targets()),
            errors: AppendLog::new(workspace.errors()),
            code_search: AppendLog::new(workspace.code_search_files()),
            converted: Mutex::new(false),
        }
    }

    /// Record one outcome. Skips leave no trace.
    pub fn record(&self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Converted { source, target, .. } => self.record_converted(source, target),
            Outcome::Failed { source, .. } => self.errors.append([source.as_path()]),
            Outcome::Skipped => Ok(()),
        }
    }

    fn record_converted(&self, source: &Path, target: &Path) -> io::Result<()> {
        let mut marked = self.converted.lock();
        if !*marked {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.marker)?;
            *marked = true;
        }
        self.sources.append([source])?;
        self.targets.append([target])
    }

    /// Whether at least one conversion was recorded.
    pub fn any_converted(&self) -> bool {
        *self.converted.lock()
    }

    /// Append code files to search for references. Empty lists write nothing.
    pub fn record_code_search(&self, files: &[PathBuf]) -> io::Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        self.code_search.append(files.iter().map(PathBuf::as_path))
    }
}
