//! Typed error hierarchy shared by every tether crate.
//!
//! Each variant maps to one failure category so callers can `match` on
//! [`XferError::kind`] to pick a recovery strategy instead of parsing
//! messages. The library itself never classifies an error as retryable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Which end of a transfer failed to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamSide {
    Source,
    Destination,
}

impl fmt::Display for StreamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSide::Source => write!(f, "source"),
            StreamSide::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Debug, Error)]
pub enum XferError {
    /// Credentials are incomplete or malformed for their mode.
    #[error("Invalid credentials: {0}")]
    Validation(String),

    /// A local file (key or transfer source) does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The transport reported a dead or unusable session handle.
    #[error("Invalid connection handle: {0}")]
    InvalidHandle(String),

    /// The transport backend is unavailable in this environment.
    #[error("Transport unavailable: {0}")]
    Capability(String),

    /// Client misconfiguration (e.g. no credentials attached).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Could not authenticate: {0}")]
    Auth(String),

    /// Operation attempted without a live session.
    #[error("Not connected")]
    NotConnected,

    /// A remote or local path is missing or unreadable before an operation.
    #[error("File does not exist or no permissions to read: {0}")]
    NotFound(String),

    #[error("Unable to open {side} stream '{path}': {source}")]
    StreamOpen {
        side: StreamSide,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Read failed on '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Write failed on '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The source stream ended before the size recorded by its stat.
    #[error("Incomplete transfer of '{path}': expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// Post-transfer verification found a different destination size.
    #[error("Different file size for '{path}': expected {expected} bytes, found {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("Unable to remove '{path}': {source}")]
    Remove {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to rename '{from}' to '{to}': {source}")]
    Rename {
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to create directory '{path}': {source}")]
    Mkdir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to delete directory '{path}': {source}")]
    Rmdir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to open directory '{path}': {source}")]
    OpenDir {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The whole-file (SCP) primitive failed.
    #[error("Transfer of '{path}' failed: {source}")]
    Transfer {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Fieldless mirror of [`XferError`] for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    FileNotFound,
    InvalidHandle,
    Capability,
    Config,
    Connect,
    Auth,
    NotConnected,
    NotFound,
    StreamOpen,
    Read,
    Write,
    IncompleteTransfer,
    SizeMismatch,
    Remove,
    Rename,
    Mkdir,
    Rmdir,
    OpenDir,
    Transfer,
}

pub type XferResult<T> = Result<T, XferError>;

impl XferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            XferError::Validation(_) => ErrorKind::Validation,
            XferError::FileNotFound(_) => ErrorKind::FileNotFound,
            XferError::InvalidHandle(_) => ErrorKind::InvalidHandle,
            XferError::Capability(_) => ErrorKind::Capability,
            XferError::Config(_) => ErrorKind::Config,
            XferError::Connect { .. } => ErrorKind::Connect,
            XferError::Auth(_) => ErrorKind::Auth,
            XferError::NotConnected => ErrorKind::NotConnected,
            XferError::NotFound(_) => ErrorKind::NotFound,
            XferError::StreamOpen { .. } => ErrorKind::StreamOpen,
            XferError::Read { .. } => ErrorKind::Read,
            XferError::Write { .. } => ErrorKind::Write,
            XferError::IncompleteTransfer { .. } => ErrorKind::IncompleteTransfer,
            XferError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            XferError::Remove { .. } => ErrorKind::Remove,
            XferError::Rename { .. } => ErrorKind::Rename,
            XferError::Mkdir { .. } => ErrorKind::Mkdir,
            XferError::Rmdir { .. } => ErrorKind::Rmdir,
            XferError::OpenDir { .. } => ErrorKind::OpenDir,
            XferError::Transfer { .. } => ErrorKind::Transfer,
        }
    }

    // ── Convenience constructors ─────────────────────────────────

    pub fn validation(msg: impl Into<String>) -> Self {
        XferError::Validation(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        XferError::NotFound(path.into())
    }

    pub fn connect(host: &str, port: u16, reason: impl fmt::Display) -> Self {
        XferError::Connect {
            host: host.to_string(),
            port,
            reason: reason.to_string(),
        }
    }

    pub fn stream_open(side: StreamSide, path: &str, source: io::Error) -> Self {
        XferError::StreamOpen {
            side,
            path: path.to_string(),
            source,
        }
    }
}

impl From<XferError> for String {
    fn from(e: XferError) -> String {
        e.to_string()
    }
}
