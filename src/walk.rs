//! Path walker: turns a filesystem subtree into the ordered entry sequence
//! shared by the archive writer, the extractor, and the removal planner.

use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PackError, Result};

/// What kind of thing a manifest entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One archived item: a path relative to a root, its kind, POSIX permission
/// bits, and (for files) the payload size in bytes.
///
/// Entries are transient; they exist only for the duration of one archive,
/// unpack, or remove call.
#[derive(Debug, Clone)]
pub struct Entry {
    pub rel_path: PathBuf,
    pub kind: EntryKind,
    pub mode: u32,
    pub size: u64,
}

/// The ordered sequence of entries produced by a walk or decoded from an
/// archive. A directory's entry always precedes the entries of everything
/// nested under it; extraction relies on that to create parents before
/// children, and removal reverses it to delete children before parents.
pub type Manifest = Vec<Entry>;

/// Enumerates `root/rel_path` and, if it is a directory, everything beneath
/// it, in pre-order with each directory's listing sorted by name so the
/// result is reproducible across platforms.
///
/// Regular files whose base name starts with `.` are excluded. Hidden
/// directories are not: a hidden directory and its non-hidden contents are
/// still included.
///
/// Any stat failure on an entry aborts the walk with an I/O error naming the
/// offending path.
pub fn walk(root: &Path, rel_path: &Path) -> Result<Manifest> {
    let top = root.join(rel_path);
    let mut manifest = Vec::new();

    let walker = WalkDir::new(&top)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_type().is_dir() || !is_hidden_name(e.file_name()));

    for item in walker {
        let entry = item.map_err(|e| walk_error(&top, e))?;
        let meta = entry.metadata().map_err(|e| walk_error(&top, e))?;

        let rel = entry.path().strip_prefix(root).map_err(|_| {
            PackError::io(
                entry.path(),
                io::Error::new(io::ErrorKind::InvalidInput, "path escapes the source root"),
            )
        })?;
        let rel: PathBuf = rel
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        // Walking "." yields the root itself with an empty relative path;
        // the root is not an entry of its own manifest.
        if rel.as_os_str().is_empty() {
            continue;
        }

        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        manifest.push(Entry {
            rel_path: rel,
            kind,
            mode: mode_bits(&meta),
            size: if kind == EntryKind::File { meta.len() } else { 0 },
        });
    }

    Ok(manifest)
}

fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn walk_error(top: &Path, err: walkdir::Error) -> PackError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| top.to_path_buf());
    match err.into_io_error() {
        Some(source) => PackError::io(path, source),
        None => PackError::io(
            path,
            io::Error::new(io::ErrorKind::Other, "filesystem loop detected"),
        ),
    }
}

#[cfg(unix)]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.is_dir() {
        0o755
    } else {
        0o644
    }
}
