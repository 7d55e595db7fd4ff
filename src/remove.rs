//! Removal planner: replays an archive manifest to delete previously
//! installed content while preserving everything else.
//!
//! The manifest is decoded once, every entry is resolved against the
//! destination root in manifest order, and the resulting paths are deleted in
//! reverse so children go before parents. There is no transactional guarantee
//! across the operation: an interrupted removal leaves some paths deleted and
//! some not, and re-running it is safe because already-absent paths are
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PackError, Result};
use crate::extract;
use crate::fsx;

/// Deletes what a previous unpack of `archive_file` into `dest_root` created.
///
/// Paths that no longer exist are skipped silently. Files are deleted
/// unconditionally; a directory is deleted only if it is empty at the moment
/// it is visited, which is after its archived children were deleted in this
/// same pass. Directories kept alive by foreign content are left in place,
/// and that is success, not partial failure.
pub fn remove(dest_root: &Path, archive_file: &Path) -> Result<()> {
    let manifest = extract::read_manifest(archive_file)?;
    let paths: Vec<PathBuf> = manifest
        .iter()
        .map(|e| dest_root.join(&e.rel_path))
        .collect();
    debug!(
        entries = paths.len(),
        dest = %dest_root.display(),
        "removing installed archive"
    );

    for path in paths.iter().rev() {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            // Already gone, possibly from an earlier interrupted removal.
            Err(_) => continue,
        };
        if meta.is_dir() {
            if fsx::is_empty_or_absent(path) {
                fs::remove_dir(path).map_err(|e| PackError::io(path, e))?;
            }
        } else {
            fs::remove_file(path).map_err(|e| PackError::io(path, e))?;
        }
    }

    Ok(())
}
