//! Path lists with set membership.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use rustc_hash::FxHashSet;

/// A set of paths with O(1) membership.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    members: FxHashSet<PathBuf>,
}

impl PathSet {
    /// Load a line-delimited path list.
    ///
    /// Accepts `\n` and `\r\n` terminators; blank lines are skipped.
    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.contains(path)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Keep the paths of `paths` that are members of this set, in their order.
    pub fn retain_members(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths.iter().filter(|p| self.contains(p)).cloned().collect()
    }
}

impl FromIterator<PathBuf> for PathSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// Whether `pattern` matches anywhere in the path's string form.
#[inline]
pub fn matches(pattern: &Regex, path: &Path) -> bool {
    pattern.is_match(&path.to_string_lossy())
}
