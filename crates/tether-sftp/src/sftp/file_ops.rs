// ── File operations ──────────────────────────────────────────────────────────

use crate::sftp::service::SftpClient;
use log::info;
use tether_core::paths::prefixed;
use tether_core::{FileStat, LocalFs, RemoteFs, Transport, XferError, XferResult};

impl<T: Transport, L: LocalFs> SftpClient<T, L> {
    // ── stat ─────────────────────────────────────────────────────────────────

    pub fn stat(&mut self, path: &str) -> XferResult<FileStat> {
        let (_, fs, _) = self.state.live()?;
        fs.stat(path).map_err(|_| XferError::not_found(path))
    }

    /// `false` covers both a missing path and one we may not stat.
    pub fn file_exists(&mut self, path: &str) -> XferResult<bool> {
        let (_, fs, _) = self.state.live()?;
        Ok(fs.stat(path).is_ok())
    }

    // ── remove ───────────────────────────────────────────────────────────────

    /// Delete `remote_prefix + path`.
    pub fn remove(&mut self, path: &str) -> XferResult<()> {
        let target = prefixed(&self.options.remote_prefix, path);
        let (_, fs, _) = self.state.live()?;

        fs.stat(&target)
            .map_err(|_| XferError::not_found(&target))?;
        fs.unlink(&target).map_err(|e| XferError::Remove {
            path: target.clone(),
            source: e,
        })?;

        info!("Removed {}", target);
        Ok(())
    }

    // ── rename ───────────────────────────────────────────────────────────────

    /// Move `remote_prefix + from` to `to`; the target is taken verbatim.
    pub fn rename(&mut self, from: &str, to: &str) -> XferResult<()> {
        let source = prefixed(&self.options.remote_prefix, from);
        let (_, fs, _) = self.state.live()?;

        fs.stat(&source)
            .map_err(|_| XferError::not_found(&source))?;
        fs.rename(&source, to).map_err(|e| XferError::Rename {
            from: source.clone(),
            to: to.to_string(),
            source: e,
        })?;

        info!("Renamed {} -> {}", source, to);
        Ok(())
    }
}
