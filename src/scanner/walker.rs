//! Sequential source-tree walker (the producer side of a run)

use crate::audit::{AuditEvent, AuditLog};
use crate::types::{Entry, SyncError};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination for walked entries
///
/// The worker pool is the production sink; tests collect into a `Vec`.
pub trait EntrySink {
    /// Take ownership of one entry. An error aborts the walk.
    fn accept(&mut self, entry: Entry) -> Result<(), SyncError>;
}

impl EntrySink for Vec<Entry> {
    fn accept(&mut self, entry: Entry) -> Result<(), SyncError> {
        self.push(entry);
        Ok(())
    }
}

/// What a walk dispatched and what it had to leave behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub directories: usize,
    pub files: usize,

    /// FIFOs, sockets, devices: never dispatched
    pub special_skipped: usize,

    /// Paths that could not be visited (logged, walk continued)
    pub errors: usize,
}

/// Build an unfiltered, depth-first walker rooted at `root`
///
/// Hidden files and ignore files get no special treatment: a backup
/// mirrors everything. Symlinks are not followed. Siblings are visited in
/// file-name order.
pub fn build_walker(root: &Path) -> ignore::Walk {
    ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
}

/// Walk `root` once, dispatching every directory and file into `sink`
///
/// The root itself is dispatched first as a directory with an empty
/// relative path.
///
/// # Errors
/// * `SourceUnreadable` if `root` cannot be listed at all
/// * whatever `sink.accept` returns (the consumers went away)
///
/// Failures on individual paths are recorded in `log` and counted in the
/// summary; the walk continues past them.
pub fn walk_source<S: EntrySink + ?Sized>(
    root: &Path,
    sink: &mut S,
    log: &AuditLog,
) -> Result<WalkSummary, SyncError> {
    fs::read_dir(root).map_err(|source| SyncError::SourceUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut summary = WalkSummary::default();

    for result in build_walker(root) {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                let error = SyncError::Traversal {
                    path: error_path(&e).unwrap_or_else(|| root.to_path_buf()),
                    message: e.to_string(),
                };
                tracing::warn!(%error, "walk continues");
                log.record(AuditEvent::Failed(&error));
                summary.errors += 1;
                continue;
            }
        };

        let Some(file_type) = entry.file_type() else {
            continue;
        };

        let relative_path = match entry.path().strip_prefix(root) {
            Ok(p) => p.to_path_buf(),
            Err(_) => {
                let error = SyncError::Traversal {
                    path: entry.path().to_path_buf(),
                    message: "path is outside the walk root".to_string(),
                };
                log.record(AuditEvent::Failed(&error));
                summary.errors += 1;
                continue;
            }
        };

        if file_type.is_dir() {
            sink.accept(Entry::directory(relative_path))?;
            summary.directories += 1;
        } else if file_type.is_file() || file_type.is_symlink() {
            sink.accept(Entry::file(relative_path))?;
            summary.files += 1;
        } else {
            // Opening a FIFO for reading would block the worker
            tracing::warn!(path = %entry.path().display(), "skipping special file");
            summary.special_skipped += 1;
        }
    }

    Ok(summary)
}

/// Path an `ignore` error refers to, if it carries one
pub(crate) fn error_path(error: &ignore::Error) -> Option<PathBuf> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errors) => errors.iter().find_map(error_path),
        _ => None,
    }
}
