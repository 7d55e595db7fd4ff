//! Filesystem probes shared by the walker, writer, extractor, and remover.

use std::fs;
use std::io;
use std::path::Path;

/// True iff a stat on `path` succeeds, whatever the kind of thing it names.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True when `path` is absent, or exists as a directory with zero entries.
///
/// This is the pruning predicate used during removal; callers must not
/// distinguish "absent" from "empty" for that purpose. A plain file is never
/// empty-or-absent.
pub fn is_empty_or_absent(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Err(_) => true,
        Ok(meta) if meta.is_dir() => match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            // Unreadable directory: treat as non-empty rather than prune blind.
            Err(_) => false,
        },
        Ok(_) => false,
    }
}

#[cfg(unix)]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
/// No-op off Unix: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn exists_covers_files_and_directories() {
        let dir = tempdir().unwrap();
        assert!(exists(dir.path()));

        let file = dir.path().join("probe");
        assert!(!exists(&file));
        File::create(&file).unwrap();
        assert!(exists(&file));
    }

    #[test]
    fn empty_or_absent_distinguishes_files_from_directories() {
        let dir = tempdir().unwrap();

        assert!(is_empty_or_absent(&dir.path().join("missing")));
        assert!(is_empty_or_absent(dir.path()));

        let file = dir.path().join("occupant");
        File::create(&file).unwrap();
        assert!(!is_empty_or_absent(&file));
        assert!(!is_empty_or_absent(dir.path()));
    }
}
