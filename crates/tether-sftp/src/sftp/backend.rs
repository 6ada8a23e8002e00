// ── libssh2 backend ──────────────────────────────────────────────────────────
//
// Implements the collaborator traits on top of the `ssh2` crate. Everything
// here is blocking; timeouts come from `Ssh2Config`.

use crate::sftp::types::Ssh2Config;
use log::{debug, info};
use ssh2::{ErrorCode, Session, Sftp};
use std::fs::File;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tether_core::{
    Authenticator, EntryType, FileStat, KeyPair, NoneAuth, RemoteDir, RemoteFs, Transport,
};

// Session error codes from libssh2.h that carry meaning beyond "failed".
// LIBSSH2_ERROR_FILE ends a readdir loop; the other two are a credential
// the server turned down.
const LIBSSH2_ERROR_FILE: i32 = -16;
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;
const LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;

fn is_declined(e: &ssh2::Error) -> bool {
    matches!(
        e.code(),
        ErrorCode::Session(LIBSSH2_ERROR_AUTHENTICATION_FAILED)
            | ErrorCode::Session(LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED)
    )
}

fn is_end_of_listing(e: &ssh2::Error) -> bool {
    matches!(e.code(), ErrorCode::Session(LIBSSH2_ERROR_FILE))
}

#[derive(Debug, Clone, Default)]
pub struct Ssh2Transport {
    config: Ssh2Config,
}

impl Ssh2Transport {
    pub fn new(config: Ssh2Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Ssh2Config {
        &self.config
    }

    fn open_tcp(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let timeout = Duration::from_secs(self.config.timeout_secs.max(1));
        let mut last_err = None;

        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(tcp) => {
                    tcp.set_nonblocking(false)?;
                    return Ok(tcp);
                }
                Err(e) => {
                    debug!("TCP connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no addresses resolved for {}", host),
            )
        }))
    }
}

/// Map a declined credential to `Ok(false)`; anything else is a real error.
fn accepted(session: &Session, result: Result<(), ssh2::Error>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(session.authenticated()),
        Err(e) if is_declined(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl Authenticator for Ssh2Transport {
    type Session = Session;

    fn auth_none(&self, session: &Session, username: &str) -> io::Result<NoneAuth> {
        // Listing methods sends a "none" request; libssh2 marks the session
        // authenticated if the server accepts it.
        match session.auth_methods(username) {
            _ if session.authenticated() => Ok(NoneAuth::Authenticated),
            Ok(methods) => Ok(NoneAuth::MethodsAvailable(
                methods
                    .split(',')
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn auth_password(&self, session: &Session, username: &str, password: &str) -> io::Result<bool> {
        accepted(session, session.userauth_password(username, password))
    }

    fn auth_public_key(&self, session: &Session, username: &str, keys: &KeyPair) -> io::Result<bool> {
        accepted(
            session,
            session.userauth_pubkey_file(
                username,
                Some(keys.public_key.as_path()),
                keys.private_key.as_path(),
                keys.passphrase.as_deref(),
            ),
        )
    }
}

impl Transport for Ssh2Transport {
    type Fs = Ssh2Fs;

    fn probe(&self) -> io::Result<()> {
        Session::new().map(|_| ()).map_err(io::Error::from)
    }

    fn connect(&self, host: &str, port: u16) -> io::Result<Session> {
        let tcp = self.open_tcp(host, port)?;

        let mut session = Session::new()?;
        let timeout_ms = self.config.timeout_secs.saturating_mul(1000).min(u32::MAX as u64);
        session.set_timeout(timeout_ms as u32);
        if self.config.compress {
            session.set_compress(true);
        }
        session.set_tcp_stream(tcp);
        session.handshake()?;

        let interval = self.config.keepalive_interval_secs;
        session.set_keepalive(interval > 0, interval.min(u32::MAX as u64) as u32);

        if let Some(banner) = session.banner() {
            debug!("{}:{} banner: {}", host, port, banner);
        }
        Ok(session)
    }

    fn open_fs(&self, session: &Session) -> io::Result<Ssh2Fs> {
        Ok(Ssh2Fs {
            sftp: session.sftp()?,
        })
    }

    fn disconnect(&self, session: &Session) -> io::Result<()> {
        session.disconnect(None, "Client disconnecting", None)?;
        Ok(())
    }

    fn keepalive(&self, session: &Session) -> io::Result<()> {
        session.keepalive_send()?;
        Ok(())
    }

    fn scp_download(&self, session: &Session, remote: &str, local: &Path) -> io::Result<u64> {
        let (mut channel, stat) = session.scp_recv(Path::new(remote))?;
        let mut local_file = File::create(local)?;

        // Stop at the announced size; the channel may carry a trailing status byte.
        let transferred = io::copy(&mut (&mut channel).take(stat.size()), &mut local_file)?;
        local_file.flush()?;

        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;

        info!("SCP received {} bytes from {}", transferred, remote);
        Ok(transferred)
    }

    fn scp_upload(&self, session: &Session, local: &Path, remote: &str) -> io::Result<u64> {
        let mut local_file = File::open(local)?;
        let meta = local_file.metadata()?;
        let mode = file_mode(&meta);

        let mut channel = session.scp_send(Path::new(remote), mode, meta.len(), None)?;
        let transferred = io::copy(&mut local_file, &mut channel)?;

        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;

        info!("SCP sent {} bytes to {}", transferred, remote);
        Ok(transferred)
    }
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> i32 {
    use std::os::unix::fs::PermissionsExt;
    (meta.permissions().mode() & 0o777) as i32
}

#[cfg(not(unix))]
fn file_mode(meta: &std::fs::Metadata) -> i32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

// ── Filesystem handle ────────────────────────────────────────────────────────

pub struct Ssh2Fs {
    sftp: Sftp,
}

pub(crate) fn stat_from_ssh2(stat: &ssh2::FileStat) -> FileStat {
    let permissions = stat.perm.unwrap_or(0);
    FileStat {
        size: stat.size.unwrap_or(0),
        permissions,
        uid: stat.uid,
        gid: stat.gid,
        accessed: stat.atime,
        modified: stat.mtime,
        entry_type: EntryType::from_mode(permissions),
    }
}

impl RemoteFs for Ssh2Fs {
    type Reader = ssh2::File;
    type Writer = ssh2::File;
    type Dir = Ssh2Dir;

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        let stat = self.sftp.stat(Path::new(path))?;
        Ok(stat_from_ssh2(&stat))
    }

    fn open_read(&self, path: &str) -> io::Result<ssh2::File> {
        Ok(self.sftp.open(Path::new(path))?)
    }

    fn open_write(&self, path: &str) -> io::Result<ssh2::File> {
        Ok(self.sftp.create(Path::new(path))?)
    }

    fn mkdir(&self, path: &str, mode: u32) -> io::Result<()> {
        Ok(self.sftp.mkdir(Path::new(path), mode as i32)?)
    }

    fn rmdir(&self, path: &str) -> io::Result<()> {
        Ok(self.sftp.rmdir(Path::new(path))?)
    }

    fn unlink(&self, path: &str) -> io::Result<()> {
        Ok(self.sftp.unlink(Path::new(path))?)
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        Ok(self.sftp.rename(Path::new(from), Path::new(to), None)?)
    }

    fn open_dir(&self, path: &str) -> io::Result<Ssh2Dir> {
        Ok(Ssh2Dir {
            handle: self.sftp.opendir(Path::new(path))?,
            exhausted: false,
        })
    }
}

/// Open directory handle. libssh2 signals the end of a listing with
/// `LIBSSH2_ERROR_FILE`; any other readdir error is passed up.
pub struct Ssh2Dir {
    handle: ssh2::File,
    exhausted: bool,
}

impl RemoteDir for Ssh2Dir {
    fn next_entry(&mut self) -> io::Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.handle.readdir() {
            Ok((name, _)) => Ok(Some(name.to_string_lossy().to_string())),
            Err(e) if is_end_of_listing(&e) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(mut self) -> io::Result<()> {
        Ok(self.handle.close()?)
    }
}
