// ── tether-sftp / sftp module ─────────────────────────────────────────────────
//
// Blocking SFTP/SCP client providing:
//   • Credentials for none / password / public-key / combined authentication
//   • A single-session client with connect / close lifecycle
//   • Streaming uploads & downloads with optional size verification
//   • Whole-file SCP transfers
//   • Remote filesystem operations (stat, list, mkdir, rmdir, rename, remove)
//   • A libssh2-backed transport

pub mod types;
pub mod credentials;
pub mod service;
pub mod transfer;
pub mod scp;
pub mod file_ops;
pub mod dir_ops;
pub mod backend;

pub use types::*;
pub use credentials::{AuthMode, AuthStep, Credentials, TryThenFallback};
pub use service::{SessionState, SftpClient};
pub use backend::{Ssh2Dir, Ssh2Fs, Ssh2Transport};
