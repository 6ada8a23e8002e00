// ── Local filesystem collaborator ────────────────────────────────────────────

use crate::types::{EntryType, FileStat};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

pub trait LocalFs {
    type Reader: Read;
    type Writer: Write;

    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    fn open_read(&self, path: &Path) -> io::Result<Self::Reader>;

    /// Create or truncate `path` for writing.
    fn open_write(&self, path: &Path) -> io::Result<Self::Writer>;

    fn basename(&self, path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }
}

/// [`LocalFs`] over `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl LocalFs for StdFs {
    type Reader = File;
    type Writer = File;

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        Ok(stat_from_metadata(&meta))
    }

    fn open_read(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }

    fn open_write(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }
}

pub fn stat_from_metadata(meta: &std::fs::Metadata) -> FileStat {
    let to_secs = |t: io::Result<std::time::SystemTime>| {
        t.ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
    };

    #[cfg(unix)]
    let (permissions, uid, gid) = {
        use std::os::unix::fs::MetadataExt;
        (meta.mode(), Some(meta.uid()), Some(meta.gid()))
    };
    #[cfg(not(unix))]
    let (permissions, uid, gid) = {
        let kind = if meta.is_dir() { 0o040000 } else { 0o100000 };
        let perm = if meta.permissions().readonly() { 0o444 } else { 0o644 };
        (kind | perm, None, None)
    };

    let entry_type = if meta.is_dir() {
        EntryType::Directory
    } else if meta.is_file() {
        EntryType::File
    } else {
        EntryType::from_mode(permissions)
    };

    FileStat {
        size: meta.len(),
        permissions,
        uid,
        gid,
        accessed: to_secs(meta.accessed()),
        modified: to_secs(meta.modified()),
        entry_type,
    }
}
