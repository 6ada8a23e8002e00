// ── Transfer engine – streaming uploads & downloads ──────────────────────────

use crate::sftp::service::SftpClient;
use crate::sftp::types::*;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tether_core::paths::{prefixed, remote_basename};
use tether_core::{LocalFs, RemoteFs, StreamSide, Transport, XferError, XferResult};
use uuid::Uuid;

impl<T: Transport, L: LocalFs> SftpClient<T, L> {
    // ── Download ─────────────────────────────────────────────────────────────

    /// Copy `remote` (verbatim) to `local_prefix + (name or basename(remote))`.
    pub fn download(&mut self, remote: &str, name: Option<&str>) -> XferResult<TransferReport> {
        let started = Utc::now();
        let destination = PathBuf::from(prefixed(
            &self.options.local_prefix,
            name.unwrap_or_else(|| remote_basename(remote)),
        ));
        let dest_display = destination.display().to_string();

        let (_, fs, session) = self.state.live()?;

        let expected = fs
            .stat(remote)
            .map_err(|_| XferError::not_found(remote))?
            .size;

        let copied = {
            let mut reader = fs
                .open_read(remote)
                .map_err(|e| XferError::stream_open(StreamSide::Source, remote, e))?;
            let mut writer = self
                .local
                .open_write(&destination)
                .map_err(|e| XferError::stream_open(StreamSide::Destination, &dest_display, e))?;
            copy_stream(
                &mut reader,
                &mut writer,
                expected,
                &self.options,
                remote,
                &dest_display,
            )?
        };
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

        info!("Downloaded {} bytes from {} to {}", copied, remote, dest_display);
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

    // ── Upload ───────────────────────────────────────────────────────────────

    /// Copy `local` (verbatim) to `remote_prefix + (name or basename(local))`.
    pub fn upload(
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

        let (_, fs, session) = self.state.live()?;

        let expected = self
            .local
            .stat(source)
            .map_err(|_| XferError::not_found(&source_display))?
            .size;

        let copied = {
            let mut reader = self
                .local
                .open_read(source)
                .map_err(|e| XferError::stream_open(StreamSide::Source, &source_display, e))?;
            let mut writer = fs
                .open_write(&destination)
                .map_err(|e| XferError::stream_open(StreamSide::Destination, &destination, e))?;
            copy_stream(
                &mut reader,
                &mut writer,
                expected,
                &self.options,
                &source_display,
                &destination,
            )?
        };
        session.bytes_uploaded += copied;

        let verified = self.options.verify_size;
        if verified {
            let actual = fs
                .stat(&destination)
                .map_err(|_| XferError::not_found(&destination))?
                .size;
            check_size(&destination, expected, actual)?;
        }

        info!("Uploaded {} bytes from {} to {}", copied, source_display, destination);
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

// ── Copy loop ────────────────────────────────────────────────────────────────

/// Copy `size` bytes from `reader` to `writer`, asking for everything still
/// missing (bounded by `max_chunk_size`) on each read.
///
/// Returns the number of bytes written; never more than were read.
pub(crate) fn copy_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    size: u64,
    options: &ClientOptions,
    source: &str,
    destination: &str,
) -> XferResult<u64> {
    let cap = options.max_chunk_size.max(1) as u64;
    let mut buf = vec![0u8; size.min(cap) as usize];
    let mut copied: u64 = 0;

    while copied < size {
        let want = (size - copied).min(cap) as usize;
        let n = match reader.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(XferError::Read {
                    path: source.to_string(),
                    source: e,
                })
            }
        };

        if n == 0 {
            match options.short_read {
                ShortReadPolicy::Fail => {
                    return Err(XferError::IncompleteTransfer {
                        path: source.to_string(),
                        expected: size,
                        actual: copied,
                    })
                }
                ShortReadPolicy::AcceptEof => {
                    warn!(
                        "{} ended after {} of {} bytes; accepting early EOF",
                        source, copied, size
                    );
                    break;
                }
            }
        }

        writer.write_all(&buf[..n]).map_err(|e| XferError::Write {
            path: destination.to_string(),
            source: e,
        })?;
        copied += n as u64;
    }

    writer.flush().map_err(|e| XferError::Write {
        path: destination.to_string(),
        source: e,
    })?;

    Ok(copied)
}

pub(crate) fn check_size(path: &str, expected: u64, actual: u64) -> XferResult<()> {
    if expected != actual {
        return Err(XferError::SizeMismatch {
            path: path.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn report(
    direction: TransferDirection,
    source: String,
    destination: String,
    expected_bytes: u64,
    bytes_transferred: u64,
    verified: bool,
    started: DateTime<Utc>,
) -> TransferReport {
    TransferReport {
        transfer_id: Uuid::new_v4().to_string(),
        direction,
        source,
        destination,
        expected_bytes,
        bytes_transferred,
        verified,
        duration_ms: (Utc::now() - started).num_milliseconds().max(0) as u64,
    }
}
