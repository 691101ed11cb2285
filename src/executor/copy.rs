//! Single-file copy with modification-time propagation

use crate::types::{CopyStage, SyncError};
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Copy buffer size
const BUFFER_SIZE: usize = 128 * 1024;

/// Copy `src` over `dest`, then stamp `dest` with the source modification time
///
/// 1. Create the whole parent chain of `dest`
/// 2. Open `src`, create/truncate `dest`
/// 3. Stream every byte
/// 4. Set `dest` access and modification time to the source mtime
///
/// Step 4 is what makes the next run's size+mtime comparison report Skip.
/// Each step maps its failure to a `SyncError::Copy` naming the stage.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SyncError)` - the first failing stage
///
/// # Example
/// ```no_run
/// use dirbackup::executor::copy_file;
/// use std::path::Path;
///
/// let bytes = copy_file(Path::new("source.txt"), Path::new("backup/source.txt"))?;
/// # Ok::<(), dirbackup::types::SyncError>(())
/// ```
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| stage_error(CopyStage::CreateParent, parent, e))?;
    }

    let mut src_file = File::open(src).map_err(|e| stage_error(CopyStage::OpenSource, src, e))?;
    let src_metadata = src_file
        .metadata()
        .map_err(|e| stage_error(CopyStage::ReadMetadata, src, e))?;
    if !src_metadata.is_file() {
        return Err(SyncError::NotAFile {
            path: src.to_path_buf(),
        });
    }

    let mut dest_file =
        File::create(dest).map_err(|e| stage_error(CopyStage::CreateTarget, dest, e))?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src_file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(stage_error(CopyStage::CopyBytes, src, e)),
        };

        dest_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| stage_error(CopyStage::CopyBytes, dest, e))?;
        total_bytes += bytes_read as u64;
    }

    dest_file
        .flush()
        .map_err(|e| stage_error(CopyStage::CopyBytes, dest, e))?;

    // Close before stamping so a late write-back cannot bump the mtime
    drop(dest_file);

    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_times(dest, mtime, mtime)
        .map_err(|e| stage_error(CopyStage::SetModTime, dest, e))?;

    Ok(total_bytes)
}

fn stage_error(stage: CopyStage, path: &Path, source: std::io::Error) -> SyncError {
    SyncError::Copy {
        stage,
        path: path.to_path_buf(),
        source,
    }
}
