//! Archive reader and extraction.
//!
//! Extraction runs two distinct passes over the archive. The validate pass
//! decodes the full manifest and checks every destination file for a
//! collision; if any exists the whole operation fails before a single byte is
//! written. The apply pass re-decodes the archive from the start (the gzip
//! stream is not rewindable, so the file is reopened) and materializes
//! entries strictly in manifest order. A single-pass extractor could write
//! several files and then hit a conflict, leaving the destination tree in a
//! state that is expensive to detect or reverse; validating first turns that
//! into a clean failure with no side effects.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{PackError, Result};
use crate::fsx;
use crate::walk::{Entry, EntryKind, Manifest};

type ArchiveStream = tar::Archive<GzDecoder<File>>;

fn open_archive(archive_file: &Path) -> Result<ArchiveStream> {
    if !fsx::exists(archive_file) {
        return Err(PackError::NotFound(archive_file.to_path_buf()));
    }
    let file = File::open(archive_file).map_err(|e| PackError::io(archive_file, e))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

/// Decodes the full manifest of an archive without touching the filesystem.
///
/// Kind is taken from the tar typeflag, falling back to the trailing-slash
/// name convention so archives from any encoder following the record layout
/// decode correctly. Entry paths are rejected if they would escape the root
/// they are later resolved against.
pub fn read_manifest(archive_file: &Path) -> Result<Manifest> {
    let mut archive = open_archive(archive_file)?;
    let mut manifest = Vec::new();

    let entries = archive
        .entries()
        .map_err(|e| PackError::format(archive_file, e))?;
    for item in entries {
        let entry = item.map_err(|e| PackError::format(archive_file, e))?;
        let header = entry.header();

        let is_dir = header.entry_type().is_dir() || entry.path_bytes().ends_with(b"/");
        let rel_path = entry
            .path()
            .map_err(|e| PackError::format(archive_file, e))?
            .into_owned();
        let rel_path = match sanitize(archive_file, &rel_path)? {
            Some(rel) => rel,
            None => continue,
        };
        let mode = header.mode().map_err(|e| PackError::format(archive_file, e))?;
        let size = header.size().map_err(|e| PackError::format(archive_file, e))?;

        manifest.push(Entry {
            rel_path,
            kind: if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            mode,
            size: if is_dir { 0 } else { size },
        });
    }

    Ok(manifest)
}

/// Recreates the archived subtree under `dest_root`.
///
/// Fails with [`PackError::WouldOverwrite`] before writing anything if any
/// destination file already exists. Pre-existing directories are legitimate
/// and are left with their current permission bits. An archive with zero
/// entries unpacks trivially.
pub fn unpack(dest_root: &Path, archive_file: &Path) -> Result<()> {
    // Validate pass: full decode, collision check, no writes.
    let manifest = read_manifest(archive_file)?;
    for entry in &manifest {
        if entry.kind == EntryKind::File {
            let dest = dest_root.join(&entry.rel_path);
            if fsx::exists(&dest) {
                return Err(PackError::WouldOverwrite(dest));
            }
        }
    }
    debug!(
        entries = manifest.len(),
        dest = %dest_root.display(),
        "unpacking archive"
    );

    fs::create_dir_all(dest_root).map_err(|e| PackError::io(dest_root, e))?;

    // Apply pass: re-decode from the start, materialize in manifest order.
    let mut archive = open_archive(archive_file)?;
    let entries = archive
        .entries()
        .map_err(|e| PackError::format(archive_file, e))?;
    for item in entries {
        let mut entry = item.map_err(|e| PackError::format(archive_file, e))?;

        let is_dir = entry.header().entry_type().is_dir() || entry.path_bytes().ends_with(b"/");
        let rel_path = entry
            .path()
            .map_err(|e| PackError::format(archive_file, e))?
            .into_owned();
        let rel_path = match sanitize(archive_file, &rel_path)? {
            Some(rel) => rel,
            None => continue,
        };
        let mode = entry
            .header()
            .mode()
            .map_err(|e| PackError::format(archive_file, e))?;
        let dest = dest_root.join(&rel_path);

        if is_dir {
            match fs::create_dir(&dest) {
                Ok(()) => {
                    fsx::set_unix_permissions(&dest, mode).map_err(|e| PackError::io(&dest, e))?;
                }
                // Directories may legitimately pre-exist; keep their mode.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dest.is_dir() => {}
                // Descendants would all fail past a directory that could not
                // be created, so abort rather than continue.
                Err(e) => return Err(PackError::io(&dest, e)),
            }
        } else {
            let mut out = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&dest)
                .map_err(|e| match e.kind() {
                    // Defensive re-check; the validate pass already vetted this.
                    io::ErrorKind::AlreadyExists => PackError::WouldOverwrite(dest.clone()),
                    _ => PackError::io(&dest, e),
                })?;
            io::copy(&mut entry, &mut out).map_err(|e| PackError::io(&dest, e))?;
            fsx::set_unix_permissions(&dest, mode).map_err(|e| PackError::io(&dest, e))?;
        }
    }

    Ok(())
}

/// Lists the manifest of an archive to standard output.
pub fn list_files(archive_file: &Path) -> Result<()> {
    let manifest = read_manifest(archive_file)?;

    println!("Archive manifest ({} entries):", manifest.len());
    for entry in &manifest {
        match entry.kind {
            EntryKind::Directory => {
                println!("- {}/ (mode {:04o})", entry.rel_path.display(), entry.mode)
            }
            EntryKind::File => println!(
                "- {} ({} bytes, mode {:04o})",
                entry.rel_path.display(),
                entry.size,
                entry.mode
            ),
        }
    }

    Ok(())
}

/// Normalizes an entry name, dropping `.` components. Returns `None` for a
/// bare root entry (`./`) and rejects absolute names and `..` traversal.
fn sanitize(archive_file: &Path, rel: &Path) -> Result<Option<PathBuf>> {
    let mut clean = PathBuf::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(PackError::format(
                    archive_file,
                    format!("entry path escapes the destination root: {}", rel.display()),
                ))
            }
        }
    }
    if clean.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(clean))
    }
}
