//! RunStats - per-run counters

use std::ops::AddAssign;
use std::time::Duration;

/// Counters for a single run
///
/// Every worker owns one of these; they are summed after the completion
/// barrier so no counter is ever shared between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// File entries pulled off the queue
    pub files_seen: usize,

    pub copied: usize,
    pub skipped: usize,

    /// Files that would have been copied in dry-run mode
    pub dry_run_copies: usize,

    /// Directories actually created (or, in dry-run mode, reported)
    pub dirs_created: usize,

    /// Target entries removed by the pruner
    pub deleted: usize,

    /// Per-item failures (logged, never fatal)
    pub failed: usize,

    pub bytes_copied: u64,

    /// Wall time for the whole run
    pub elapsed: Duration,
}

impl RunStats {
    /// True when nothing needed to change
    pub fn is_noop(&self) -> bool {
        self.copied == 0
            && self.dry_run_copies == 0
            && self.dirs_created == 0
            && self.deleted == 0
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, other: Self) {
        self.files_seen += other.files_seen;
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.dry_run_copies += other.dry_run_copies;
        self.dirs_created += other.dirs_created;
        self.deleted += other.deleted;
        self.failed += other.failed;
        self.bytes_copied += other.bytes_copied;
        self.elapsed = self.elapsed.max(other.elapsed);
    }
}
