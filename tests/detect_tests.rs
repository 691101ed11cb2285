//! Tests for change detection between a source and a target file

use dirbackup::diff::should_copy;
use dirbackup::types::{ChangeReason, CopyDecision};
use filetime::FileTime;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_with_mtime(path: &Path, content: &[u8], unix_secs: i64) {
    fs::write(path, content).expect("write file");
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).expect("set mtime");
}

#[test]
fn test_missing_target_is_copied() {
    let tmp = TempDir::new().expect("create tempdir");
    let src = tmp.path().join("a.txt");
    write_with_mtime(&src, b"data", 1_600_000_000);

    let decision = should_copy(&src, &tmp.path().join("absent.txt"));

    assert!(matches!(decision, CopyDecision::Copy(ChangeReason::Missing)));
}

#[test]
fn test_identical_size_and_mtime_is_skipped() {
    let tmp = TempDir::new().expect("create tempdir");
    let src = tmp.path().join("src.txt");
    let dst = tmp.path().join("dst.txt");
    write_with_mtime(&src, b"same", 1_600_000_000);
    // content is never compared, only metadata
    write_with_mtime(&dst, b"diff", 1_600_000_000);

    assert!(should_copy(&src, &dst).is_skip());
}

#[test]
fn test_size_change_is_copied() {
    let tmp = TempDir::new().expect("create tempdir");
    let src = tmp.path().join("src.txt");
    let dst = tmp.path().join("dst.txt");
    write_with_mtime(&src, b"longer content", 1_600_000_000);
    write_with_mtime(&dst, b"short", 1_600_000_000);

    assert!(matches!(
        should_copy(&src, &dst),
        CopyDecision::Copy(ChangeReason::SizeChanged)
    ));
}

#[test]
fn test_newer_and_older_target_are_both_copied() {
    let tmp = TempDir::new().expect("create tempdir");
    let src = tmp.path().join("src.txt");
    let newer = tmp.path().join("newer.txt");
    let older = tmp.path().join("older.txt");
    write_with_mtime(&src, b"same", 1_600_000_000);
    write_with_mtime(&newer, b"same", 1_700_000_000);
    write_with_mtime(&older, b"same", 1_500_000_000);

    assert!(matches!(
        should_copy(&src, &newer),
        CopyDecision::Copy(ChangeReason::ModTimeChanged)
    ));
    assert!(matches!(
        should_copy(&src, &older),
        CopyDecision::Copy(ChangeReason::ModTimeChanged)
    ));
}

#[test]
fn test_missing_source_is_error() {
    let tmp = TempDir::new().expect("create tempdir");

    let decision = should_copy(&tmp.path().join("gone.txt"), &tmp.path().join("dst.txt"));

    assert!(decision.is_error());
}
