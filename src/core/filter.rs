//! Path qualification.
//!
//! [`PathFilter`] decides whether a discovered filesystem entry is a unit of
//! work. It is a pure predicate: extension strings are normalized by the
//! configuration layer before the filter is built, so no error conditions
//! exist here.

use std::collections::HashSet;
use std::path::Path;

/// Decides whether a discovered entry qualifies as a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    /// Directories are the units of work; files never qualify.
    Directories,
    /// Files are the units of work, optionally restricted to a set of
    /// normalized (lower-case, dot-prefixed) extensions. `None` matches
    /// every file.
    Files {
        extensions: Option<HashSet<String>>,
    },
}

impl PathFilter {
    /// Match every file.
    pub fn all_files() -> Self {
        Self::Files { extensions: None }
    }

    /// Match files whose extension is in the given normalized set. An empty
    /// set degenerates to matching every file.
    pub fn with_extensions(extensions: HashSet<String>) -> Self {
        if extensions.is_empty() {
            Self::all_files()
        } else {
            Self::Files {
                extensions: Some(extensions),
            }
        }
    }

    /// Does this entry qualify as a task?
    pub fn qualifies(&self, path: &Path, is_dir: bool) -> bool {
        match self {
            PathFilter::Directories => is_dir,
            PathFilter::Files { extensions } => {
                if is_dir {
                    return false;
                }
                match extensions {
                    None => true,
                    Some(set) => path
                        .extension()
                        .map(|ext| set.contains(&format!(".{}", ext.to_string_lossy().to_lowercase())))
                        .unwrap_or(false),
                }
            }
        }
    }
}
