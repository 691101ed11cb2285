//! Main sync command

use crate::audit::{AuditEvent, AuditLog};
use crate::config::SyncJob;
use crate::executor::{prune, RunContext, WorkerPool};
use crate::scanner::walk_source;
use crate::types::{RunStats, SyncError};
use std::sync::Arc;
use std::time::Instant;

/// Run one full synchronization of `job`
///
/// Phases, strictly in order:
/// 1. walk the source, feeding the file workers and the directory consumer
/// 2. close the queues and wait for every task (completion barrier)
/// 3. prune the target, only with `delete_extraneous` and without `dry_run`
///
/// Per-item failures only show up in `log` and in `RunStats::failed`.
/// The returned error is the first structural failure; when the copy phase
/// fails structurally, pruning is skipped.
///
/// Blocks the calling thread; do not call from inside an async runtime.
pub fn run(job: SyncJob, log: Arc<AuditLog>) -> Result<RunStats, SyncError> {
    job.validate()?;

    let started = Instant::now();
    tracing::info!(
        source = %job.source_root.display(),
        target = %job.target_root.display(),
        dry_run = job.dry_run,
        delete_extraneous = job.delete_extraneous,
        concurrency = job.concurrency,
        "run started"
    );
    log.record(AuditEvent::RunStarted {
        source: &job.source_root,
        target: &job.target_root,
    });

    let result = run_phases(job, &log);

    log.record(AuditEvent::RunCompleted);
    if let Err(e) = &result {
        log.record(AuditEvent::RunFailed(e));
    }
    log.flush();

    result.map(|mut stats| {
        stats.elapsed = started.elapsed();
        tracing::info!(
            copied = stats.copied,
            skipped = stats.skipped,
            deleted = stats.deleted,
            failed = stats.failed,
            "run completed"
        );
        stats
    })
}

fn run_phases(job: SyncJob, log: &Arc<AuditLog>) -> Result<RunStats, SyncError> {
    let ctx = RunContext::new(job, Arc::clone(log));
    let job = Arc::clone(&ctx.job);

    let mut pool = WorkerPool::new(ctx)?;
    let walk_result = walk_source(&job.source_root, &mut pool, log);

    // Drain even after a failed walk so no worker outlives the copy phase
    let pool_result = pool.close_and_wait();

    let walk = walk_result?;
    let mut stats = pool_result?;
    stats.failed += walk.errors;
    tracing::debug!(
        directories = walk.directories,
        files = walk.files,
        special_skipped = walk.special_skipped,
        "copy phase drained"
    );

    if job.should_prune() {
        stats += prune(&job.source_root, &job.target_root, log)?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_logs_start_and_completion() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let log = Arc::new(AuditLog::memory());

        run(SyncJob::new(src.path(), dst.path()), Arc::clone(&log)).expect("run");

        let lines = log.messages_starting_with("Backup ");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Backup started: "));
        assert_eq!(lines[1], "Backup completed.");
    }

    #[test]
    fn test_run_rejects_invalid_job_before_touching_anything() {
        let src = TempDir::new().expect("create src tempdir");
        let log = Arc::new(AuditLog::memory());

        let err = run(
            SyncJob::new(src.path(), src.path().join("dst")).with_concurrency(0),
            Arc::clone(&log),
        )
        .expect_err("invalid job");

        assert!(err.is_config_error());
        assert!(log.lines().is_empty());
        assert!(!src.path().join("dst").exists());
    }

    #[test]
    fn test_structural_failure_skips_prune() {
        let tmp = TempDir::new().expect("create tempdir");
        let dst = tmp.path().join("dst");
        fs::create_dir(&dst).expect("create dst");
        fs::write(dst.join("precious.txt"), b"keep").expect("write dst file");
        let log = Arc::new(AuditLog::memory());

        let job = SyncJob::new(tmp.path().join("missing-src"), &dst).with_delete_extraneous(true);
        let err = run(job, Arc::clone(&log)).expect_err("missing source must fail");

        assert!(matches!(err, SyncError::SourceUnreadable { .. }));
        assert!(dst.join("precious.txt").exists());
        assert_eq!(log.messages_starting_with("Error: ").len(), 1);
        assert_eq!(log.messages_starting_with("Backup completed.").len(), 1);
    }

    #[test]
    fn test_run_counts_copied_bytes() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(src.path().join("a.bin"), vec![7u8; 4096]).expect("write src");
        let log = Arc::new(AuditLog::memory());

        let stats = run(SyncJob::new(src.path(), dst.path()), log).expect("run");

        assert_eq!(stats.copied, 1);
        assert_eq!(stats.bytes_copied, 4096);
    }
}
