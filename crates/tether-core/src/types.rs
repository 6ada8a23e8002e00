// ── Stat types shared by remote and local collaborators ──────────────────────

use serde::{Deserialize, Serialize};

const S_IFMT: u32 = 0o170000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    Other,
    Unknown,
}

impl EntryType {
    /// Determine the entry type from unix mode bits.
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            0o100000 => EntryType::File,
            0o040000 => EntryType::Directory,
            0o120000 => EntryType::Symlink,
            0 => EntryType::Unknown,
            _ => EntryType::Other,
        }
    }
}

/// Metadata for one path, remote or local.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    pub size: u64,
    pub permissions: u32,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub accessed: Option<u64>,
    pub modified: Option<u64>,
    pub entry_type: EntryType,
}

impl FileStat {
    /// Regular file of `size` bytes with mode `0o100644`.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            permissions: 0o100644,
            uid: None,
            gid: None,
            accessed: None,
            modified: None,
            entry_type: EntryType::File,
        }
    }

    pub fn directory() -> Self {
        Self {
            size: 0,
            permissions: 0o040755,
            uid: None,
            gid: None,
            accessed: None,
            modified: None,
            entry_type: EntryType::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn permissions_string(&self) -> String {
        format_permissions(self.permissions)
    }
}

/// Render mode bits the way `ls -l` does, e.g. "drwxr-xr-x".
pub fn format_permissions(mode: u32) -> String {
    let mut s = String::with_capacity(10);

    s.push(match mode & S_IFMT {
        0o040000 => 'd',
        0o120000 => 'l',
        0o010000 => 'p',
        0o140000 => 's',
        0o060000 => 'b',
        0o020000 => 'c',
        _ => '-',
    });

    // (read, write, exec, special bit, special char when exec / without exec)
    let triads = [
        (0o400, 0o200, 0o100, 0o4000, ('s', 'S')),
        (0o040, 0o020, 0o010, 0o2000, ('s', 'S')),
        (0o004, 0o002, 0o001, 0o1000, ('t', 'T')),
    ];

    for (r, w, x, special, (with_x, without_x)) in triads {
        s.push(if mode & r != 0 { 'r' } else { '-' });
        s.push(if mode & w != 0 { 'w' } else { '-' });
        s.push(match (mode & special != 0, mode & x != 0) {
            (true, true) => with_x,
            (true, false) => without_x,
            (false, true) => 'x',
            (false, false) => '-',
        });
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_from_mode_bits() {
        assert_eq!(EntryType::from_mode(0o100644), EntryType::File);
        assert_eq!(EntryType::from_mode(0o040755), EntryType::Directory);
        assert_eq!(EntryType::from_mode(0o120777), EntryType::Symlink);
        assert_eq!(EntryType::from_mode(0o010644), EntryType::Other);
        assert_eq!(EntryType::from_mode(0o644), EntryType::Unknown);
    }

    #[test]
    fn permissions_string_formats() {
        assert_eq!(format_permissions(0o040755), "drwxr-xr-x");
        assert_eq!(format_permissions(0o100644), "-rw-r--r--");
        assert_eq!(format_permissions(0o104755), "-rwsr-xr-x");
        assert_eq!(format_permissions(0o041777), "drwxrwxrwt");
        assert_eq!(format_permissions(0o101644), "-rw-r--r-T");
    }

    #[test]
    fn file_stat_helpers() {
        let f = FileStat::file(12);
        assert!(f.is_file());
        assert!(!f.is_dir());
        assert_eq!(f.permissions_string(), "-rw-r--r--");
        assert!(FileStat::directory().is_dir());
    }

    #[test]
    fn file_stat_serialization() {
        let json = serde_json::to_value(FileStat::file(3)).unwrap();
        assert_eq!(json["entryType"], "file");
        assert_eq!(json["size"], 3);
    }
}
