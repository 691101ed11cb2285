//! Run summary and failure formatting

use crate::types::{RunStats, SyncError};
use indicatif::{HumanBytes, HumanDuration};
use std::io::ErrorKind;

/// One-line summary printed after a run
pub fn format_run_summary(stats: &RunStats, dry_run: bool) -> String {
    if stats.is_noop() {
        return format!(
            "Already up to date: {} file(s) checked, {} error(s) in {}",
            stats.skipped,
            stats.failed,
            HumanDuration(stats.elapsed)
        );
    }

    if dry_run {
        return format!(
            "Dry run: {} file(s) would be copied, {} would be created, {} up to date, {} error(s) in {}",
            stats.dry_run_copies,
            directories(stats.dirs_created),
            stats.skipped,
            stats.failed,
            HumanDuration(stats.elapsed)
        );
    }

    format!(
        "Copied {} file(s) ({}), created {}, deleted {}, {} up to date, {} error(s) in {}",
        stats.copied,
        HumanBytes(stats.bytes_copied),
        directories(stats.dirs_created),
        stats.deleted,
        stats.skipped,
        stats.failed,
        HumanDuration(stats.elapsed)
    )
}

fn directories(count: usize) -> String {
    match count {
        1 => "1 directory".to_string(),
        n => format!("{} directories", n),
    }
}

/// Operator-facing description of a run-level failure, with a hint
pub fn format_failure(error: &SyncError) -> String {
    match suggestion(error) {
        Some(hint) => format!("Error: {}\n  Try: {}", error, hint),
        None => format!("Error: {}", error),
    }
}

fn suggestion(error: &SyncError) -> Option<&'static str> {
    match error {
        _ if error.is_permission_error() => {
            Some("Check permissions or run as a user that can read the source.")
        }
        SyncError::SourceUnreadable { source, .. } if source.kind() == ErrorKind::NotFound => {
            Some("Verify the source path exists and is mounted.")
        }
        SyncError::SourceUnreadable { .. } => {
            Some("Check that the source path is a readable directory.")
        }
        SyncError::TargetUnreadable { .. } => {
            Some("Check that the target directory exists and is readable.")
        }
        SyncError::Config(_) => Some("Run with --help to see the expected arguments."),
        SyncError::Worker(_) => Some("Re-run the backup; if it persists, report a bug."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_summary_uses_human_readable_bytes() {
        let stats = RunStats {
            copied: 3,
            bytes_copied: 5 * 1024 * 1024,
            deleted: 1,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        let summary = format_run_summary(&stats, false);

        assert!(summary.starts_with("Copied 3 file(s)"));
        assert!(summary.contains("MiB"), "got: {summary}");
        assert!(summary.contains("deleted 1"));
    }

    #[test]
    fn test_dry_run_summary_reports_would_copy() {
        let stats = RunStats {
            dry_run_copies: 7,
            ..Default::default()
        };
        let summary = format_run_summary(&stats, true);

        assert!(summary.starts_with("Dry run: 7 file(s) would be copied"));
    }

    #[test]
    fn test_failure_for_missing_source_has_hint() {
        let err = SyncError::SourceUnreadable {
            path: PathBuf::from("/mnt/photos"),
            source: std::io::Error::new(ErrorKind::NotFound, "No such file or directory"),
        };
        let text = format_failure(&err);

        assert!(text.starts_with("Error: Cannot read source directory /mnt/photos"));
        assert!(text.contains("Try: Verify the source path exists"));
    }

    #[test]
    fn test_summary_pluralizes_directories() {
        let one = RunStats {
            copied: 1,
            dirs_created: 1,
            ..Default::default()
        };
        let many = RunStats {
            dry_run_copies: 1,
            dirs_created: 3,
            ..Default::default()
        };

        assert!(format_run_summary(&one, false).contains("created 1 directory,"));
        assert!(format_run_summary(&many, true).contains("3 directories would be created"));
        assert!(!format_run_summary(&many, true).contains("(y/ies)"));
    }

    #[test]
    fn test_noop_summary() {
        let stats = RunStats {
            skipped: 12,
            ..Default::default()
        };
        assert!(format_run_summary(&stats, false).starts_with("Already up to date: 12 file(s)"));
    }

    #[test]
    fn test_permission_failure_hint() {
        let err = SyncError::TargetUnreadable {
            path: PathBuf::from("/backup"),
            source: std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format_failure(&err).contains("Try: Check permissions"));
    }

    #[test]
    fn test_failure_without_hint_is_single_line() {
        let err = SyncError::Service("child exited".to_string());
        assert_eq!(format_failure(&err), "Error: Service error: child exited");
    }
}
