//! Entry - a path discovered while walking a tree

use std::path::{Path, PathBuf};

/// Whether a walked path goes to the directory consumer or the file workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single walked path, relative to the root being walked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative path from the walk root (empty for the root itself)
    pub relative_path: PathBuf,

    pub kind: EntryKind,
}

impl Entry {
    pub fn directory(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn file(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Resolve this entry under another root
    ///
    /// The root entry (empty relative path) resolves to `root` itself.
    pub fn under(&self, root: &Path) -> PathBuf {
        if self.relative_path.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&self.relative_path)
        }
    }
}
