//! File comparison logic

use crate::types::{ChangeReason, CopyDecision, SyncError};
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Decide whether `target` must be rewritten from `source`
///
/// Metadata-only comparison, read fresh from the filesystem on every call:
///
/// 1. **Missing target** → Copy
/// 2. **Size mismatch** → Copy
/// 3. **Modification time** not exactly equal (either direction) → Copy
/// 4. Otherwise → Skip
///
/// A stat failure on the target other than "not found" (or any failure on
/// the source) yields `CopyDecision::Error`; the caller logs it and moves on.
///
/// # Example
/// ```no_run
/// use dirbackup::diff::should_copy;
/// use std::path::Path;
///
/// let decision = should_copy(Path::new("src/a.txt"), Path::new("dst/a.txt"));
/// if decision.is_copy() {
///     println!("a.txt is stale");
/// }
/// ```
pub fn should_copy(source: &Path, target: &Path) -> CopyDecision {
    let src_meta = match fs::metadata(source) {
        Ok(meta) => meta,
        Err(e) => {
            return CopyDecision::Error(SyncError::Stat {
                path: source.to_path_buf(),
                source: e,
            })
        }
    };

    let dst_meta = match fs::metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return CopyDecision::Copy(ChangeReason::Missing)
        }
        Err(e) => {
            return CopyDecision::Error(SyncError::Stat {
                path: target.to_path_buf(),
                source: e,
            })
        }
    };

    match compare_metadata(&src_meta, &dst_meta) {
        Ok(decision) => decision,
        Err(e) => CopyDecision::Error(SyncError::Stat {
            path: target.to_path_buf(),
            source: e,
        }),
    }
}

/// Compare two already-read metadata records
///
/// Modification times must match exactly. No tolerance window is applied,
/// so a filesystem that truncates timestamps will cause re-copies.
pub fn compare_metadata(
    src: &Metadata,
    dst: &Metadata,
) -> Result<CopyDecision, std::io::Error> {
    if src.len() != dst.len() {
        return Ok(CopyDecision::Copy(ChangeReason::SizeChanged));
    }

    let src_mtime: SystemTime = src.modified()?;
    let dst_mtime: SystemTime = dst.modified()?;
    if src_mtime != dst_mtime {
        return Ok(CopyDecision::Copy(ChangeReason::ModTimeChanged));
    }

    Ok(CopyDecision::Skip)
}
