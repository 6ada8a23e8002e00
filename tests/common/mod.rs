//! In-memory SSH server used by the integration tests.
#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read, Write};
use std::path::Path;
use std::rc::Rc;
use tether::{
    Authenticator, Credentials, FileStat, KeyPair, NoneAuth, RemoteDir, RemoteFs, SftpClient,
    Transport, DEFAULT_SSH_PORT,
};

#[derive(Default)]
pub struct FakeServer {
    pub files: BTreeMap<String, Vec<u8>>,
    /// Directory path → mode it was created with.
    pub dirs: BTreeMap<String, u32>,
    /// Paths that exist but may not be touched.
    pub forbidden: BTreeSet<String>,

    pub password: Option<String>,
    pub accept_keys: bool,
    pub allow_anonymous: bool,

    pub unavailable: bool,
    pub refuse_connections: bool,
    pub sftp_disabled: bool,
    pub keepalive_fails: bool,
    pub disconnect_fails: bool,
    /// Directory reads fail after yielding N entries.
    pub listing_fails_after: Option<usize>,
    /// Writes silently keep only the first N bytes of a file.
    pub truncate_writes_at: Option<usize>,
    /// Read streams end after N bytes regardless of the file size.
    pub short_reads_at: Option<usize>,

    pub next_session: u32,
    pub open_sessions: BTreeSet<u32>,
    pub connects: u32,
    pub disconnects: u32,
    pub key_attempts: u32,
    pub password_attempts: u32,
    pub keepalives: u32,
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn denied(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("{}: permission denied", path))
}

fn missing(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file", path))
}

impl FakeServer {
    fn dir_exists(&self, path: &str) -> bool {
        path.is_empty() || self.dirs.contains_key(path)
    }

    fn check(&self, path: &str) -> io::Result<()> {
        if self.forbidden.contains(path) {
            return Err(denied(path));
        }
        Ok(())
    }

    fn children(&self, dir: &str) -> Vec<String> {
        self.files
            .keys()
            .chain(self.dirs.keys())
            .filter(|p| p.as_str() != dir && parent(p) == dir)
            .map(|p| p.rsplit('/').next().unwrap_or(p).to_string())
            .collect()
    }

    fn store(&mut self, path: &str, data: &[u8]) {
        let keep = self.truncate_writes_at.unwrap_or(usize::MAX).min(data.len());
        self.files.insert(path.to_string(), data[..keep].to_vec());
    }
}

// ── Transport ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeTransport {
    server: Rc<RefCell<FakeServer>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let transport = Self::default();
        transport.server().dirs.insert("/".into(), 0o755);
        transport
    }

    pub fn with_password(password: &str) -> Self {
        let transport = Self::new();
        transport.server().password = Some(password.to_string());
        transport
    }

    pub fn server(&self) -> RefMut<'_, FakeServer> {
        self.server.borrow_mut()
    }

    pub fn put_file(&self, path: &str, data: &[u8]) {
        self.server().files.insert(path.to_string(), data.to_vec());
    }

    pub fn put_dir(&self, path: &str) {
        self.server().dirs.insert(path.to_string(), 0o755);
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.server.borrow().files.get(path).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.server.borrow().dirs.contains_key(path)
    }
}

impl Authenticator for FakeTransport {
    type Session = u32;

    fn auth_none(&self, _session: &u32, _username: &str) -> io::Result<NoneAuth> {
        if self.server.borrow().allow_anonymous {
            Ok(NoneAuth::Authenticated)
        } else {
            Ok(NoneAuth::MethodsAvailable(vec![
                "publickey".into(),
                "password".into(),
            ]))
        }
    }

    fn auth_password(&self, _session: &u32, _username: &str, password: &str) -> io::Result<bool> {
        let mut server = self.server();
        server.password_attempts += 1;
        Ok(server.password.as_deref() == Some(password))
    }

    fn auth_public_key(&self, _session: &u32, _username: &str, keys: &KeyPair) -> io::Result<bool> {
        let mut server = self.server();
        server.key_attempts += 1;
        if !keys.private_key.exists() {
            return Err(missing(&keys.private_key.display().to_string()));
        }
        Ok(server.accept_keys)
    }
}

impl Transport for FakeTransport {
    type Fs = FakeFs;

    fn probe(&self) -> io::Result<()> {
        if self.server.borrow().unavailable {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "ssh library not loaded"));
        }
        Ok(())
    }

    fn connect(&self, _host: &str, _port: u16) -> io::Result<u32> {
        let mut server = self.server();
        server.connects += 1;
        if server.refuse_connections {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
        }
        server.next_session += 1;
        let id = server.next_session;
        server.open_sessions.insert(id);
        Ok(id)
    }

    fn open_fs(&self, _session: &u32) -> io::Result<FakeFs> {
        if self.server.borrow().sftp_disabled {
            return Err(io::Error::new(io::ErrorKind::Other, "subsystem request failed"));
        }
        Ok(FakeFs {
            server: Rc::clone(&self.server),
        })
    }

    fn disconnect(&self, session: &u32) -> io::Result<()> {
        let mut server = self.server();
        server.disconnects += 1;
        server.open_sessions.remove(session);
        if server.disconnect_fails {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "socket closed"));
        }
        Ok(())
    }

    fn keepalive(&self, _session: &u32) -> io::Result<()> {
        let mut server = self.server();
        if server.keepalive_fails {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "socket closed"));
        }
        server.keepalives += 1;
        Ok(())
    }

    fn scp_download(&self, _session: &u32, remote: &str, local: &Path) -> io::Result<u64> {
        let data = {
            let server = self.server.borrow();
            server.check(remote)?;
            server.files.get(remote).cloned().ok_or_else(|| missing(remote))?
        };
        std::fs::write(local, &data)?;
        Ok(data.len() as u64)
    }

    fn scp_upload(&self, _session: &u32, local: &Path, remote: &str) -> io::Result<u64> {
        let data = std::fs::read(local)?;
        let mut server = self.server();
        server.check(remote)?;
        if !server.dir_exists(parent(remote)) {
            return Err(missing(parent(remote)));
        }
        server.store(remote, &data);
        Ok(data.len() as u64)
    }
}

// ── Filesystem ───────────────────────────────────────────────────────────────

pub struct FakeFs {
    server: Rc<RefCell<FakeServer>>,
}

pub struct FakeReader {
    data: Vec<u8>,
    pos: usize,
}

impl Read for FakeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

pub struct FakeWriter {
    server: Rc<RefCell<FakeServer>>,
    path: String,
    buf: Vec<u8>,
}

impl Write for FakeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        self.server.borrow_mut().store(&self.path, &self.buf);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct FakeDir {
    entries: std::vec::IntoIter<String>,
    fails_after: Option<usize>,
    yielded: usize,
}

impl RemoteDir for FakeDir {
    fn next_entry(&mut self) -> io::Result<Option<String>> {
        if self.fails_after == Some(self.yielded) {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "channel closed"));
        }
        self.yielded += 1;
        Ok(self.entries.next())
    }

    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

impl RemoteFs for FakeFs {
    type Reader = FakeReader;
    type Writer = FakeWriter;
    type Dir = FakeDir;

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        let server = self.server.borrow();
        let path = normalize(path);
        server.check(path)?;
        if let Some(data) = server.files.get(path) {
            Ok(FileStat::file(data.len() as u64))
        } else if let Some(mode) = server.dirs.get(path) {
            Ok(FileStat {
                permissions: 0o040000 | mode,
                ..FileStat::directory()
            })
        } else {
            Err(missing(path))
        }
    }

    fn open_read(&self, path: &str) -> io::Result<FakeReader> {
        let server = self.server.borrow();
        server.check(path)?;
        let mut data = server.files.get(path).cloned().ok_or_else(|| missing(path))?;
        if let Some(limit) = server.short_reads_at {
            data.truncate(limit);
        }
        Ok(FakeReader { data, pos: 0 })
    }

    fn open_write(&self, path: &str) -> io::Result<FakeWriter> {
        let mut server = self.server.borrow_mut();
        server.check(path)?;
        if !server.dir_exists(parent(path)) {
            return Err(missing(parent(path)));
        }
        server.files.insert(path.to_string(), Vec::new());
        Ok(FakeWriter {
            server: Rc::clone(&self.server),
            path: path.to_string(),
            buf: Vec::new(),
        })
    }

    fn mkdir(&self, path: &str, mode: u32) -> io::Result<()> {
        let mut server = self.server.borrow_mut();
        let path = normalize(path);
        server.check(path)?;
        if server.dirs.contains_key(path) || server.files.contains_key(path) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists"));
        }
        if !server.dir_exists(parent(path)) {
            return Err(missing(parent(path)));
        }
        server.dirs.insert(path.to_string(), mode);
        Ok(())
    }

    fn rmdir(&self, path: &str) -> io::Result<()> {
        let mut server = self.server.borrow_mut();
        let path = normalize(path);
        server.check(path)?;
        if !server.dirs.contains_key(path) {
            return Err(missing(path));
        }
        if !server.children(path).is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "directory not empty"));
        }
        server.dirs.remove(path);
        Ok(())
    }

    fn unlink(&self, path: &str) -> io::Result<()> {
        let mut server = self.server.borrow_mut();
        server.check(path)?;
        server.files.remove(path).map(|_| ()).ok_or_else(|| missing(path))
    }

    fn rename(&self, from: &str, to: &str) -> io::Result<()> {
        let mut server = self.server.borrow_mut();
        server.check(from)?;
        server.check(to)?;
        if !server.dir_exists(parent(to)) {
            return Err(missing(parent(to)));
        }
        let data = server.files.remove(from).ok_or_else(|| missing(from))?;
        server.files.insert(to.to_string(), data);
        Ok(())
    }

    fn open_dir(&self, path: &str) -> io::Result<FakeDir> {
        let server = self.server.borrow();
        let path = normalize(path);
        server.check(path)?;
        if !server.dirs.contains_key(path) {
            return Err(missing(path));
        }
        let mut entries = vec![".".to_string(), "..".to_string()];
        entries.extend(server.children(path));
        Ok(FakeDir {
            entries: entries.into_iter(),
            fails_after: server.listing_fails_after,
            yielded: 0,
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

pub const PASSWORD: &str = "correct horse";

/// A client logged in with password credentials against `transport`.
pub fn connected(transport: &FakeTransport) -> SftpClient<FakeTransport> {
    let mut client = SftpClient::new(transport.clone()).unwrap();
    client.set_credentials(Credentials::with_password("alice", PASSWORD).unwrap());
    client.connect("sftp.example.org", DEFAULT_SSH_PORT).unwrap();
    client
}

/// `dir` rendered as a local prefix ending in a separator.
pub fn local_prefix(dir: &Path) -> String {
    format!("{}/", dir.display())
}
