// ── SCP – whole-file transfers over a dedicated channel ──────────────────────

use crate::sftp::service::SftpClient;
use crate::sftp::transfer::{check_size, report};
use crate::sftp::types::*;
use chrono::Utc;
use log::info;
use std::path::{Path, PathBuf};
use tether_core::paths::{prefixed, remote_basename};
use tether_core::{LocalFs, RemoteFs, Transport, XferError, XferResult};

impl<T: Transport, L: LocalFs> SftpClient<T, L> {
    /// Same path rules as [`SftpClient::download`], one transport call.
    pub fn scp_download(&mut self, remote: &str, name: Option<&str>) -> XferResult<TransferReport> {
        let started = Utc::now();
        let destination = PathBuf::from(prefixed(
            &self.options.local_prefix,
            name.unwrap_or_else(|| remote_basename(remote)),
        ));
        let dest_display = destination.display().to_string();

        let (raw, fs, session) = self.state.live()?;

        let expected = fs
            .stat(remote)
            .map_err(|_| XferError::not_found(remote))?
            .size;

        let copied = self
            .transport
            .scp_download(raw, remote, &destination)
            .map_err(|e| XferError::Transfer {
                path: remote.to_string(),
                source: e,
            })?;
        session.bytes_downloaded += copied;

        let verified = self.options.verify_size;
        if verified {
            let actual = self
                .local
                .stat(&destination)
                .map_err(|_| XferError::not_found(&dest_display))?
                .size;
            check_size(&dest_display, expected, actual)?;
        }

        info!("SCP downloaded {} bytes from {} to {}", copied, remote, dest_display);
        Ok(report(
            TransferDirection::Download,
            remote.to_string(),
            dest_display,
            expected,
            copied,
            verified,
            started,
        ))
    }

    /// Same path rules as [`SftpClient::upload`], one transport call.
    pub fn scp_upload(
        &mut self,
        local: impl AsRef<Path>,
        name: Option<&str>,
    ) -> XferResult<TransferReport> {
        let started = Utc::now();
        let source = local.as_ref();
        let source_display = source.display().to_string();
        let destination = match name {
            Some(name) => prefixed(&self.options.remote_prefix, name),
            None => prefixed(&self.options.remote_prefix, &self.local.basename(source)),
        };

        let (raw, fs, session) = self.state.live()?;

        let expected = self
            .local
            .stat(source)
            .map_err(|_| XferError::not_found(&source_display))?
            .size;

        let copied = self
            .transport
            .scp_upload(raw, source, &destination)
            .map_err(|e| XferError::Transfer {
                path: destination.clone(),
                source: e,
            })?;
        session.bytes_uploaded += copied;

        let verified = self.options.verify_size;
        if verified {
            let actual = fs
                .stat(&destination)
                .map_err(|_| XferError::not_found(&destination))?
                .size;
            check_size(&destination, expected, actual)?;
        }

        info!("SCP uploaded {} bytes from {} to {}", copied, source_display, destination);
        Ok(report(
            TransferDirection::Upload,
            source_display,
            destination,
            expected,
            copied,
            verified,
            started,
        ))
    }
}
