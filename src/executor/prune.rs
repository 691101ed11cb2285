//! Removal of target entries that no longer exist in the source

use crate::audit::{AuditEvent, AuditLog};
use crate::scanner::{build_walker, error_path};
use crate::types::{RunStats, SyncError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Delete everything under `target_root` whose source counterpart is absent
///
/// Must only run after the copy phase has fully drained. A directory with
/// no source counterpart is removed in one recursive action and its
/// descendants are not visited. Only a definite "not found" on the source
/// side triggers a deletion; any other stat failure keeps the entry.
///
/// # Returns
/// Counters for deletions and per-entry failures.
///
/// # Errors
/// `TargetUnreadable` if `target_root` cannot be listed at all. Failures on
/// individual entries are logged and the walk continues.
pub fn prune(
    source_root: &Path,
    target_root: &Path,
    log: &AuditLog,
) -> Result<RunStats, SyncError> {
    fs::read_dir(target_root).map_err(|source| SyncError::TargetUnreadable {
        path: target_root.to_path_buf(),
        source,
    })?;

    let mut stats = RunStats::default();
    let mut removed_dirs: Vec<PathBuf> = Vec::new();

    for result in build_walker(target_root) {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                let path = error_path(&e);
                let already_removed = path
                    .as_ref()
                    .is_some_and(|p| removed_dirs.iter().any(|dir| p.starts_with(dir)));
                if !already_removed {
                    let error = SyncError::Traversal {
                        path: path.unwrap_or_else(|| target_root.to_path_buf()),
                        message: e.to_string(),
                    };
                    tracing::warn!(%error, "prune walk continues");
                    log.record(AuditEvent::Failed(&error));
                    stats.failed += 1;
                }
                continue;
            }
        };

        let target_path = entry.path();
        if removed_dirs.iter().any(|dir| target_path.starts_with(dir)) {
            continue;
        }

        let relative_path = match target_path.strip_prefix(target_root) {
            Ok(p) if !p.as_os_str().is_empty() => p,
            // never the target root itself
            _ => continue,
        };
        let source_path = source_root.join(relative_path);

        match fs::symlink_metadata(&source_path) {
            Ok(_) => continue,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                let error = SyncError::Stat {
                    path: source_path,
                    source: e,
                };
                log.record(AuditEvent::Failed(&error));
                stats.failed += 1;
                continue;
            }
        }

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        match remove_entry(target_path, is_dir) {
            Ok(()) => {
                if is_dir {
                    removed_dirs.push(target_path.to_path_buf());
                }
                stats.deleted += 1;
                log.record(AuditEvent::Deleted(target_path));
            }
            Err(error) => {
                tracing::warn!(%error, "delete failed");
                log.record(AuditEvent::Failed(&error));
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Remove a directory recursively, or a single file/symlink
fn remove_entry(path: &Path, is_dir: bool) -> Result<(), SyncError> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SyncError::Delete {
            path: path.to_path_buf(),
            source,
        }),
    }
}
