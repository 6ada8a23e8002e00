// ── Types ─────────────────────────────────────────────────────────────────────

use crate::sftp::credentials::AuthMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Mode used by `make_directory` when none is given.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

// ── Serde default helpers ────────────────────────────────────────────────────

fn default_false() -> bool {
    false
}
fn default_chunk_size() -> usize {
    1_048_576 // 1 MiB
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_keepalive_secs() -> u64 {
    60
}

// ── Client options ───────────────────────────────────────────────────────────

/// What the copy loop does when the source stream ends before the size its
/// stat reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ShortReadPolicy {
    /// Fail with `IncompleteTransfer`.
    #[default]
    Fail,
    /// Treat the early end as the real end of the file and report the bytes
    /// actually copied.
    AcceptEof,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// Re-stat the destination after each transfer and compare sizes.
    #[serde(default = "default_false")]
    pub verify_size: bool,
    #[serde(default)]
    pub short_read: ShortReadPolicy,
    /// Upper bound on a single read request in the copy loop.
    #[serde(default = "default_chunk_size")]
    pub max_chunk_size: usize,
    /// Prepended to the destination name of downloads.
    #[serde(default)]
    pub local_prefix: String,
    /// Prepended to the destination name of uploads and to the target of
    /// `remove`/`rename`.
    #[serde(default)]
    pub remote_prefix: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_size: default_false(),
            short_read: ShortReadPolicy::default(),
            max_chunk_size: default_chunk_size(),
            local_prefix: String::new(),
            remote_prefix: String::new(),
        }
    }
}

// ── libssh2 backend configuration ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ssh2Config {
    /// TCP connect timeout and blocking-call timeout on the session.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 0 disables keepalives.
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_interval_secs: u64,
    #[serde(default)]
    pub compress: bool,
}

impl Default for Ssh2Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            keepalive_interval_secs: default_keepalive_secs(),
            compress: false,
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_mode: AuthMode,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub bytes_uploaded: u64,
    pub bytes_downloaded: u64,
    pub operations_count: u64,
}

// ── Transfers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransferDirection {
    Upload,
    Download,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReport {
    pub transfer_id: String,
    pub direction: TransferDirection,
    pub source: String,
    pub destination: String,
    /// Size recorded by the source stat before the copy started.
    pub expected_bytes: u64,
    pub bytes_transferred: u64,
    /// True when the destination size was checked after the copy.
    pub verified: bool,
    pub duration_ms: u64,
}
