// ── Directory operations ─────────────────────────────────────────────────────

use crate::sftp::service::SftpClient;
use crate::sftp::types::DEFAULT_DIR_MODE;
use log::{info, warn};
use tether_core::paths::remote_ancestors;
use tether_core::{LocalFs, RemoteDir, RemoteFs, Transport, XferError, XferResult};

impl<T: Transport, L: LocalFs> SftpClient<T, L> {
    // ── List directory ───────────────────────────────────────────────────────

    /// Entry names in server order. "." and ".." are included when the
    /// server reports them.
    pub fn get_file_list(&mut self, dir: &str) -> XferResult<Vec<String>> {
        let (_, fs, _) = self.state.live()?;

        fs.stat(dir).map_err(|_| XferError::not_found(dir))?;
        let mut handle = fs.open_dir(dir).map_err(|e| XferError::OpenDir {
            path: dir.to_string(),
            source: e,
        })?;

        let mut entries = Vec::new();
        let drained = loop {
            match handle.next_entry() {
                Ok(Some(name)) => entries.push(name),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = handle.close() {
            warn!("Closing directory handle for {} failed: {}", dir, e);
        }
        drained.map_err(|e| XferError::OpenDir {
            path: dir.to_string(),
            source: e,
        })?;
        Ok(entries)
    }

    // ── mkdir ────────────────────────────────────────────────────────────────

    /// Create `path` with `mode` (default 0o777). With `recursive`, missing
    /// parents are created first. The leaf itself is always created, so an
    /// existing `path` is an error either way.
    pub fn make_directory(
        &mut self,
        path: &str,
        mode: Option<u32>,
        recursive: bool,
    ) -> XferResult<()> {
        let (_, fs, _) = self.state.live()?;
        let mode = mode.unwrap_or(DEFAULT_DIR_MODE);

        let mkdir = |dir: &str| {
            fs.mkdir(dir, mode).map_err(|e| XferError::Mkdir {
                path: dir.to_string(),
                source: e,
            })
        };

        if recursive {
            let mut ancestors = remote_ancestors(path);
            ancestors.pop();
            for dir in ancestors {
                if fs.stat(&dir).is_ok() {
                    continue;
                }
                mkdir(&dir)?;
            }
        }
        mkdir(path)?;
        info!("Created directory {} ({:o})", path, mode);
        Ok(())
    }

    // ── rmdir ────────────────────────────────────────────────────────────────

    /// Remove an empty directory.
    pub fn remove_directory(&mut self, path: &str) -> XferResult<()> {
        let (_, fs, _) = self.state.live()?;
        fs.rmdir(path).map_err(|e| XferError::Rmdir {
            path: path.to_string(),
            source: e,
        })?;
        info!("Removed directory {}", path);
        Ok(())
    }
}
