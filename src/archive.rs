//! Archive writer: serializes a walked subtree into a gzip-compressed tar
//! container, all-or-nothing.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};
use tracing::debug;

use crate::error::{PackError, Result};
use crate::fsx;
use crate::walk::{self, EntryKind};

/// Captures `root/rel_path` into a new archive at `target`.
///
/// The source must exist and `target` must not: an existing archive is never
/// silently overwritten. On any failure during the walk or the write, the
/// partially written target is deleted so no artifact is left behind, and the
/// triggering error is returned unchanged.
pub fn archive(root: &Path, rel_path: &Path, target: &Path) -> Result<()> {
    let source = root.join(rel_path);
    if !fsx::exists(&source) {
        return Err(PackError::NotFound(source));
    }
    if fsx::exists(target) {
        return Err(PackError::AlreadyExists(target.to_path_buf()));
    }

    match write_archive(root, rel_path, target) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(target);
            Err(err)
        }
    }
}

fn write_archive(root: &Path, rel_path: &Path, target: &Path) -> Result<()> {
    let manifest = walk::walk(root, rel_path)?;
    debug!(
        entries = manifest.len(),
        target = %target.display(),
        "writing archive"
    );

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => PackError::AlreadyExists(target.to_path_buf()),
            _ => PackError::io(target, e),
        })?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = Builder::new(encoder);

    for entry in &manifest {
        let mut header = Header::new_gnu();
        header.set_mode(entry.mode);
        header.set_mtime(0);
        match entry.kind {
            EntryKind::Directory => {
                header.set_entry_type(EntryType::dir());
                header.set_size(0);
                tar.append_data(&mut header, dir_name(&entry.rel_path), io::empty())
                    .map_err(|e| PackError::io(&entry.rel_path, e))?;
            }
            EntryKind::File => {
                header.set_entry_type(EntryType::file());
                header.set_size(entry.size);
                let abs = root.join(&entry.rel_path);
                let reader = File::open(&abs).map_err(|e| PackError::io(&abs, e))?;
                tar.append_data(&mut header, &entry.rel_path, reader)
                    .map_err(|e| PackError::io(&abs, e))?;
            }
        }
    }

    // Close order matters: tar trailer, then gzip trailer, then the file.
    // Out-of-order finalization silently corrupts the archive.
    let encoder = tar.into_inner().map_err(|e| PackError::io(target, e))?;
    encoder.finish().map_err(|e| PackError::io(target, e))?;
    Ok(())
}

/// Directory names carry a trailing separator so kind survives decoding even
/// through encoders that do not preserve the typeflag.
fn dir_name(rel: &Path) -> PathBuf {
    let mut name = rel.as_os_str().to_os_string();
    name.push("/");
    PathBuf::from(name)
}
