//! Executor module for file operations
//!
//! Per-item work lives here: the detect-then-copy sequence a file worker
//! runs for each queued file, and the directory creator run by the single
//! directory consumer. Failures are recorded and counted, never returned.

pub mod copy;
pub mod pool;
pub mod prune;

use crate::audit::{AuditEvent, AuditLog};
use crate::config::SyncJob;
use crate::diff::should_copy;
use crate::types::{CopyDecision, Entry, RunStats, SyncError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

pub use copy::copy_file;
pub use pool::WorkerPool;
pub use prune::prune;

/// Read-only state shared by every task of one run
#[derive(Clone)]
pub struct RunContext {
    pub job: Arc<SyncJob>,
    pub log: Arc<AuditLog>,
}

impl RunContext {
    pub fn new(job: SyncJob, log: Arc<AuditLog>) -> Self {
        Self {
            job: Arc::new(job),
            log,
        }
    }

    /// Log a per-item failure and count it
    pub(crate) fn record_failure(&self, error: &SyncError, stats: &mut RunStats) {
        tracing::warn!(%error, "item skipped");
        self.log.record(AuditEvent::Failed(error));
        stats.failed += 1;
    }
}

/// Detect-then-copy for one walked file
///
/// Runs on a file worker. In dry-run mode a stale file only produces a
/// "would copy" notice and the target is never touched.
pub fn process_file(ctx: &RunContext, entry: &Entry, stats: &mut RunStats) {
    let src_path = entry.under(&ctx.job.source_root);
    let dst_path = entry.under(&ctx.job.target_root);
    stats.files_seen += 1;

    match should_copy(&src_path, &dst_path) {
        CopyDecision::Skip => {
            stats.skipped += 1;
            ctx.log.record(AuditEvent::UpToDate(&src_path));
        }
        CopyDecision::Copy(reason) => {
            tracing::debug!(path = %entry.relative_path.display(), ?reason, "stale");
            if ctx.job.dry_run {
                stats.dry_run_copies += 1;
                ctx.log.record(AuditEvent::WouldCopy {
                    source: &src_path,
                    target: &dst_path,
                });
                return;
            }

            match copy_file(&src_path, &dst_path) {
                Ok(bytes) => {
                    stats.copied += 1;
                    stats.bytes_copied += bytes;
                    ctx.log.record(AuditEvent::Copied {
                        source: &src_path,
                        target: &dst_path,
                    });
                }
                Err(e) => ctx.record_failure(&e, stats),
            }
        }
        CopyDecision::Error(e) => ctx.record_failure(&e, stats),
    }
}

/// Create `path` and any missing ancestors
///
/// # Returns
/// * `Ok(true)` - the directory was created by this call
/// * `Ok(false)` - it already existed
pub fn ensure_directory(path: &Path) -> Result<bool, SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(SyncError::CreateDir {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    "a non-directory entry is in the way",
                ),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(SyncError::CreateDir {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }

    fs::create_dir_all(path).map_err(|source| SyncError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Materialize one walked directory in the target
///
/// Runs on the directory consumer. Covers directories that no file copy
/// would ever create (empty ones, the target root itself).
pub fn create_directory(ctx: &RunContext, entry: &Entry, stats: &mut RunStats) {
    let dst_path = entry.under(&ctx.job.target_root);

    if ctx.job.dry_run {
        match fs::symlink_metadata(&dst_path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                stats.dirs_created += 1;
                ctx.log.record(AuditEvent::WouldCreateDirectory(&dst_path));
            }
            Err(source) => {
                let error = SyncError::Stat {
                    path: dst_path,
                    source,
                };
                ctx.record_failure(&error, stats);
            }
        }
        return;
    }

    match ensure_directory(&dst_path) {
        Ok(true) => {
            stats.dirs_created += 1;
            ctx.log.record(AuditEvent::DirectoryCreated(&dst_path));
        }
        Ok(false) => {}
        Err(e) => ctx.record_failure(&e, stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn context(src: &TempDir, dst: &TempDir, dry_run: bool) -> RunContext {
        let job = SyncJob::new(src.path(), dst.path()).with_dry_run(dry_run);
        RunContext::new(job, Arc::new(AuditLog::memory()))
    }

    #[test]
    fn test_process_file_copies_missing_file() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(src.path().join("new.txt"), b"new-content").expect("write src");

        let ctx = context(&src, &dst, false);
        let mut stats = RunStats::default();
        process_file(&ctx, &Entry::file("new.txt"), &mut stats);

        assert_eq!(stats.copied, 1);
        assert_eq!(stats.bytes_copied, 11);
        assert_eq!(
            fs::read(dst.path().join("new.txt")).expect("read dst"),
            b"new-content"
        );
        assert_eq!(ctx.log.messages_starting_with("Copied: ").len(), 1);
    }

    #[test]
    fn test_process_file_skips_identical_file() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let mtime = FileTime::from_unix_time(1_700_000_000, 0);
        for root in [src.path(), dst.path()] {
            let path = root.join("same.txt");
            fs::write(&path, b"same").expect("write file");
            filetime::set_file_mtime(&path, mtime).expect("set mtime");
        }

        let ctx = context(&src, &dst, false);
        let mut stats = RunStats::default();
        process_file(&ctx, &Entry::file("same.txt"), &mut stats);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.copied, 0);
        assert!(ctx.log.messages_starting_with("Copied: ").is_empty());
        assert_eq!(
            ctx.log
                .messages_starting_with("File is already up-to-date: ")
                .len(),
            1
        );
    }

    #[test]
    fn test_process_file_dry_run_leaves_target_untouched() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(src.path().join("new.txt"), b"data").expect("write src");

        let ctx = context(&src, &dst, true);
        let mut stats = RunStats::default();
        process_file(&ctx, &Entry::file("new.txt"), &mut stats);

        assert_eq!(stats.dry_run_copies, 1);
        assert!(!dst.path().join("new.txt").exists());
        assert_eq!(
            ctx.log
                .messages_starting_with("[Dry Run] File would be copied: ")
                .len(),
            1
        );
    }

    #[test]
    fn test_process_file_failure_is_counted_not_fatal() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");

        let ctx = context(&src, &dst, false);
        let mut stats = RunStats::default();
        process_file(&ctx, &Entry::file("vanished.txt"), &mut stats);

        assert_eq!(stats.failed, 1);
        assert_eq!(ctx.log.messages_starting_with("Error ").len(), 1);
    }

    #[test]
    fn test_ensure_directory_reports_creation_once() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("a/b/c");

        assert!(ensure_directory(&path).expect("first call"));
        assert!(path.is_dir());
        assert!(!ensure_directory(&path).expect("second call"));
    }

    #[test]
    fn test_ensure_directory_rejects_file_in_the_way() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("occupied");
        fs::write(&path, b"file").expect("write file");

        assert!(ensure_directory(&path).is_err());
    }

    #[test]
    fn test_create_directory_dry_run_only_logs() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");

        let ctx = context(&src, &dst, true);
        let mut stats = RunStats::default();
        create_directory(&ctx, &Entry::directory("empty"), &mut stats);

        assert!(!dst.path().join("empty").exists());
        assert_eq!(stats.dirs_created, 1);
        assert_eq!(
            ctx.log
                .messages_starting_with("[Dry Run] Would create directory: ")
                .len(),
            1
        );
    }

    #[test]
    fn test_create_directory_dry_run_reports_unreadable_target() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        // a file where a parent directory should be: stat fails with
        // something other than "not found"
        fs::write(dst.path().join("blocker"), b"file").expect("write file");

        let ctx = context(&src, &dst, true);
        let mut stats = RunStats::default();
        create_directory(&ctx, &Entry::directory("blocker/sub"), &mut stats);

        assert_eq!(stats.dirs_created, 0);
        assert_eq!(stats.failed, 1);
        assert!(ctx
            .log
            .messages_starting_with("[Dry Run] Would create directory: ")
            .is_empty());
        assert_eq!(ctx.log.messages_starting_with("Error getting file info").len(), 1);
    }

    #[test]
    fn test_create_directory_existing_is_silent() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::create_dir(dst.path().join("there")).expect("create dir");

        let ctx = context(&src, &dst, false);
        let mut stats = RunStats::default();
        create_directory(&ctx, &Entry::directory("there"), &mut stats);

        assert_eq!(stats.dirs_created, 0);
        assert!(ctx.log.lines().is_empty());
    }
}
