//! Collaborator seams consumed by the client.
//!
//! A [`Transport`] owns the SSH-level primitives (connect, authenticate,
//! disconnect, whole-file SCP copies) and derives a [`RemoteFs`] handle from
//! an authenticated session. Every primitive reports plain [`io::Result`];
//! the client decides which error kind a failure becomes.

use crate::types::FileStat;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Outcome of a "none" authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoneAuth {
    /// The server accepted the user without credentials.
    Authenticated,
    /// The server rejected "none" and listed the methods it accepts.
    MethodsAvailable(Vec<String>),
}

/// Key material handed to [`Authenticator::auth_public_key`].
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl KeyPair {
    pub fn new(public_key: impl Into<PathBuf>, private_key: impl Into<PathBuf>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            passphrase: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// First existing default identity under `~/.ssh` (ed25519, rsa, ecdsa),
    /// provided its `.pub` companion exists too.
    pub fn default_identity() -> Option<Self> {
        let ssh_dir = dirs::home_dir()?.join(".ssh");
        Self::identity_in(&ssh_dir)
    }

    pub(crate) fn identity_in(ssh_dir: &Path) -> Option<Self> {
        ["id_ed25519", "id_rsa", "id_ecdsa"].iter().find_map(|name| {
            let private_key = ssh_dir.join(name);
            let public_key = ssh_dir.join(format!("{}.pub", name));
            (private_key.exists() && public_key.exists())
                .then(|| Self::new(public_key, private_key))
        })
    }
}

pub trait Authenticator {
    /// Raw, not yet authenticated session handle.
    type Session;

    fn auth_none(&self, session: &Self::Session, username: &str) -> io::Result<NoneAuth>;

    fn auth_password(
        &self,
        session: &Self::Session,
        username: &str,
        password: &str,
    ) -> io::Result<bool>;

    fn auth_public_key(
        &self,
        session: &Self::Session,
        username: &str,
        keys: &KeyPair,
    ) -> io::Result<bool>;
}

pub trait Transport: Authenticator {
    type Fs: RemoteFs;

    /// Check that the backend is usable at all (library loaded, etc.).
    fn probe(&self) -> io::Result<()>;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Session>;

    /// Start the filesystem subsystem on an authenticated session.
    fn open_fs(&self, session: &Self::Session) -> io::Result<Self::Fs>;

    /// Terminate the remote session through the protocol's disconnect message.
    fn disconnect(&self, session: &Self::Session) -> io::Result<()>;

    fn keepalive(&self, _session: &Self::Session) -> io::Result<()> {
        Ok(())
    }

    /// Copy a whole remote file to `local` over a dedicated channel.
    /// Returns the number of bytes written.
    fn scp_download(&self, session: &Self::Session, remote: &str, local: &Path)
        -> io::Result<u64>;

    /// Copy a whole local file to `remote` over a dedicated channel.
    /// Returns the number of bytes sent.
    fn scp_upload(&self, session: &Self::Session, local: &Path, remote: &str) -> io::Result<u64>;
}

/// Filesystem-protocol handle derived from an authenticated session.
pub trait RemoteFs {
    type Reader: Read;
    type Writer: Write;
    type Dir: RemoteDir;

    fn stat(&self, path: &str) -> io::Result<FileStat>;

    fn open_read(&self, path: &str) -> io::Result<Self::Reader>;

    /// Create or truncate `path` for writing.
    fn open_write(&self, path: &str) -> io::Result<Self::Writer>;

    /// Create a single directory level.
    fn mkdir(&self, path: &str, mode: u32) -> io::Result<()>;

    fn rmdir(&self, path: &str) -> io::Result<()>;

    fn unlink(&self, path: &str) -> io::Result<()>;

    fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    fn open_dir(&self, path: &str) -> io::Result<Self::Dir>;
}

/// Open directory handle; yields raw entry names in server order,
/// including "." and "..". `Ok(None)` marks the end of the listing.
pub trait RemoteDir {
    fn next_entry(&mut self) -> io::Result<Option<String>>;

    fn close(self) -> io::Result<()>;
}
