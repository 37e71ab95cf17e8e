//! Workspace directory holding the run's input lists and result logs.
//!
//! ```text
//! .image-converter-temp/
//! ├── .staged_files                    # input: paths the user is committing
//! ├── .converter_exclusions            # input: one regex per line
//! ├── .conversion                      # marker: exists iff something converted
//! ├── .converted_source_image_files    # log: converted sources
//! ├── .converted_target_image_files    # log: written derivatives
//! ├── .code_search_files               # log: code files to rewrite references in
//! └── .converter_errors                # log: candidates that failed
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default workspace directory, relative to the working directory.
pub const DEFAULT_DIR: &str = ".image-converter-temp";

const STAGED_FILES: &str = ".staged_files";
const EXCLUSIONS: &str = ".converter_exclusions";
const CONVERSION_MARKER: &str = ".conversion";
const CONVERTED_SOURCES: &str = ".converted_source_image_files";
const CONVERTED_TARGETS: &str = ".converted_target_image_files";
const CODE_SEARCH_FILES: &str = ".code_search_files";
const ERRORS: &str = ".converter_errors";

/// Result files cleared by [`Workspace::reset`]. Inputs are left alone.
const RESULT_FILES: [&str; 5] = [
    CONVERSION_MARKER,
    CODE_SEARCH_FILES,
    CONVERTED_SOURCES,
    CONVERTED_TARGETS,
    ERRORS,
];

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if needed and delete result files of a
    /// previous run.
    pub fn reset(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        for name in RESULT_FILES {
            match fs::remove_file(self.root.join(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub fn staged_files(&self) -> PathBuf {
        self.root.join(STAGED_FILES)
    }

    pub fn exclusions(&self) -> PathBuf {
        self.root.join(EXCLUSIONS)
    }

    pub fn conversion_marker(&self) -> PathBuf {
        self.root.join(CONVERSION_MARKER)
    }

    pub fn converted_sources(&self) -> PathBuf {
        self.root.join(CONVERTED_SOURCES)
    }

    pub fn converted_targets(&self) -> PathBuf {
        self.root.join(CONVERTED_TARGETS)
    }

    pub fn code_search_files(&self) -> PathBuf {
        self.root.join(CODE_SEARCH_FILES)
    }

    pub fn errors(&self) -> PathBuf {
        self.root.join(ERRORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reset_creates_directory() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().join("nested/work"));
        workspace.reset().unwrap();
        assert!(workspace.root().is_dir());
    }

    #[test]
    fn test_reset_clears_results_keeps_inputs() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        for path in [
            workspace.conversion_marker(),
            workspace.converted_sources(),
            workspace.converted_targets(),
            workspace.code_search_files(),
            workspace.errors(),
            workspace.staged_files(),
            workspace.exclusions(),
        ] {
            fs::write(path, "x\n").unwrap();
        }

        workspace.reset().unwrap();

        assert!(!workspace.conversion_marker().exists());
        assert!(!workspace.converted_sources().exists());
        assert!(!workspace.converted_targets().exists());
        assert!(!workspace.code_search_files().exists());
        assert!(!workspace.errors().exists());
        assert!(workspace.staged_files().exists());
        assert!(workspace.exclusions().exists());
    }

    #[test]
    fn test_reset_twice_is_fine() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path());
        workspace.reset().unwrap();
        workspace.reset().unwrap();
    }
}
