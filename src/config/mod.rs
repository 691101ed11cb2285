//! Configuration management

use crate::types::SyncError;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// Worker count used when none is given
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Audit log written next to the working directory by default
pub const DEFAULT_LOG_FILE: &str = "backup.log";

/// Mirror a source directory into a target directory, copying only what changed
#[derive(Debug, Parser)]
#[command(name = "dirbackup", version, about, long_about = None)]
pub struct Cli {
    /// Source directory
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Target directory
    #[arg(long, value_name = "DIR")]
    pub target: PathBuf,

    /// Only report what would change (pass --dry-run=false to apply)
    #[arg(
        long = "dry-run",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        require_equals = true
    )]
    pub dry_run: bool,

    /// Delete files in the target that no longer exist in the source
    #[arg(
        long = "del-old",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        require_equals = true
    )]
    pub delete_old: bool,

    /// Number of concurrent copy workers
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Append-only audit log
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Don't echo audit lines to stdout
    #[arg(short, long)]
    pub quiet: bool,
}

/// One source/target pair to synchronize
///
/// Immutable once a run starts; the coordinator owns it for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub source_root: PathBuf,
    pub target_root: PathBuf,

    /// Remove target entries with no source counterpart
    pub delete_extraneous: bool,

    /// Compute and log decisions without touching the target
    pub dry_run: bool,

    /// Number of file workers (also the queue capacity)
    pub concurrency: usize,
}

impl SyncJob {
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            delete_extraneous: false,
            dry_run: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_delete_extraneous(mut self, delete_extraneous: bool) -> Self {
        self.delete_extraneous = delete_extraneous;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// True when the prune phase should follow the copy phase
    pub fn should_prune(&self) -> bool {
        self.delete_extraneous && !self.dry_run
    }

    /// Validate configuration
    ///
    /// Source existence is not checked here; an unreadable
    /// source root is reported by the walker as a structural run error.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.source_root.as_os_str().is_empty() {
            return Err(SyncError::Config("source path is required".to_string()));
        }
        if self.target_root.as_os_str().is_empty() {
            return Err(SyncError::Config("target path is required".to_string()));
        }
        if self.concurrency == 0 {
            return Err(SyncError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        let source = resolve_location(&self.source_root);
        let target = resolve_location(&self.target_root);
        if source == target {
            return Err(SyncError::Config(
                "Source and target cannot be the same".to_string(),
            ));
        }
        if target.starts_with(&source) {
            return Err(SyncError::Config(format!(
                "Target {} cannot be inside source {}",
                self.target_root.display(),
                self.source_root.display()
            )));
        }
        if source.starts_with(&target) {
            return Err(SyncError::Config(format!(
                "Source {} cannot be inside target {}",
                self.source_root.display(),
                self.target_root.display()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Cli> for SyncJob {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let job = SyncJob::new(cli.source, cli.target)
            .with_dry_run(cli.dry_run)
            .with_delete_extraneous(cli.delete_old)
            .with_concurrency(cli.concurrency);
        job.validate()?;
        Ok(job)
    }
}

/// Absolute, symlink-free form of `path`
///
/// The nearest existing ancestor is canonicalized and the missing tail is
/// appended, so a target that does not exist yet still compares correctly.
fn resolve_location(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |resolved, part| resolved.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
