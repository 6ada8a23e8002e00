// ── SftpClient – session lifecycle management ────────────────────────────────

use crate::sftp::credentials::{AuthMode, Credentials};
use crate::sftp::types::*;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use tether_core::{LocalFs, StdFs, Transport, XferError, XferResult};
use uuid::Uuid;

// ── Session state ────────────────────────────────────────────────────────────

/// Raw session and filesystem handle are stored together or not at all.
pub enum SessionState<S, F> {
    Disconnected,
    Connected { raw: S, fs: F, info: SessionInfo },
}

impl<S, F> SessionState<S, F> {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }

    /// Liveness guard in front of every remote operation.
    pub(crate) fn live(&mut self) -> XferResult<(&S, &F, &mut SessionInfo)> {
        match self {
            SessionState::Connected { raw, fs, info } => {
                info.last_activity = Utc::now();
                info.operations_count += 1;
                Ok((raw, fs, info))
            }
            SessionState::Disconnected => Err(XferError::NotConnected),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct SftpClient<T: Transport, L: LocalFs = StdFs> {
    pub(crate) transport: T,
    pub(crate) local: L,
    pub(crate) credentials: Option<Arc<Credentials>>,
    pub(crate) options: ClientOptions,
    pub(crate) state: SessionState<T::Session, T::Fs>,
    host: Option<String>,
    port: Option<u16>,
}

impl<T: Transport> SftpClient<T, StdFs> {
    /// Probe the transport and build a disconnected client with default options.
    pub fn new(transport: T) -> XferResult<Self> {
        Self::with_options(transport, ClientOptions::default())
    }

    pub fn with_options(transport: T, options: ClientOptions) -> XferResult<Self> {
        Self::with_local_fs(transport, StdFs, options)
    }
}

impl<T: Transport, L: LocalFs> SftpClient<T, L> {
    pub fn with_local_fs(transport: T, local: L, options: ClientOptions) -> XferResult<Self> {
        transport
            .probe()
            .map_err(|e| XferError::Capability(e.to_string()))?;

        Ok(Self {
            transport,
            local,
            credentials: None,
            options,
            state: SessionState::Disconnected,
            host: None,
            port: None,
        })
    }

    // ── Configuration ────────────────────────────────────────────────────────

    pub fn set_credentials(&mut self, credentials: impl Into<Arc<Credentials>>) -> &mut Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_deref()
    }

    /// Takes effect from the next transfer on.
    pub fn set_local_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.options.local_prefix = prefix.into();
        self
    }

    pub fn local_prefix(&self) -> &str {
        &self.options.local_prefix
    }

    pub fn set_remote_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.options.remote_prefix = prefix.into();
        self
    }

    pub fn remote_prefix(&self) -> &str {
        &self.options.remote_prefix
    }

    pub fn set_verify_size(&mut self, verify: bool) -> &mut Self {
        self.options.verify_size = verify;
        self
    }

    pub fn verify_size(&self) -> bool {
        self.options.verify_size
    }

    pub fn set_short_read_policy(&mut self, policy: ShortReadPolicy) -> &mut Self {
        self.options.short_read = policy;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Connect ──────────────────────────────────────────────────────────────

    pub fn connect(&mut self, host: &str, port: u16) -> XferResult<SessionInfo> {
        let credentials = self
            .credentials
            .clone()
            .ok_or_else(|| XferError::Config("no credentials attached to the client".into()))?;

        if self.state.is_connected() {
            info!("Replacing existing session before connecting to {}:{}", host, port);
            self.close();
        }

        self.host = Some(host.to_string());
        self.port = Some(port);

        info!("Connecting to {}:{}", host, port);
        let raw = self
            .transport
            .connect(host, port)
            .map_err(|e| XferError::connect(host, port, e))?;

        let (fs, auth_mode) = match self.establish(&credentials, &raw, host, port) {
            Ok(established) => established,
            Err(e) => {
                if let Err(teardown) = self.transport.disconnect(&raw) {
                    warn!(
                        "Releasing half-open session to {}:{} failed: {}",
                        host, port, teardown
                    );
                }
                return Err(e);
            }
        };

        let now = Utc::now();
        let info = SessionInfo {
            id: Uuid::new_v4().to_string(),
            host: host.to_string(),
            port,
            username: credentials.username().unwrap_or_default().to_string(),
            auth_mode,
            connected_at: now,
            last_activity: now,
            bytes_uploaded: 0,
            bytes_downloaded: 0,
            operations_count: 0,
        };

        info!(
            "Session {} established to {}:{} as '{}' via {}",
            info.id, host, port, info.username, info.auth_mode
        );

        self.state = SessionState::Connected {
            raw,
            fs,
            info: info.clone(),
        };
        Ok(info)
    }

    /// Authenticate the raw session and derive its filesystem handle.
    fn establish(
        &self,
        credentials: &Credentials,
        raw: &T::Session,
        host: &str,
        port: u16,
    ) -> XferResult<(T::Fs, AuthMode)> {
        match credentials.authorize(&self.transport, raw) {
            Ok(true) => {}
            Ok(false) => {
                return Err(XferError::Auth(format!(
                    "{}:{} rejected {} authentication for '{}'",
                    host,
                    port,
                    credentials.mode().map(|m| m.to_string()).unwrap_or_default(),
                    credentials.username().unwrap_or_default()
                )))
            }
            Err(e @ XferError::Validation(_)) | Err(e @ XferError::Auth(_)) => return Err(e),
            Err(e) => return Err(XferError::Auth(e.to_string())),
        }

        let mode = credentials
            .mode()
            .ok_or_else(|| XferError::validation("authentication mode not set"))?;

        let fs = self
            .transport
            .open_fs(raw)
            .map_err(|e| XferError::connect(host, port, format!("filesystem subsystem: {}", e)))?;
        Ok((fs, mode))
    }

    // ── Disconnect ───────────────────────────────────────────────────────────

    /// Tear down the session. Never fails; safe to call when disconnected.
    pub fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Disconnected);
        if let SessionState::Connected { raw, fs, info } = state {
            drop(fs);
            if let Err(e) = self.transport.disconnect(&raw) {
                warn!("Disconnect of session {} failed: {}", info.id, e);
            }
            info!(
                "Session {} to {}:{} closed ({} operations, {} bytes up, {} bytes down)",
                info.id,
                info.host,
                info.port,
                info.operations_count,
                info.bytes_uploaded,
                info.bytes_downloaded
            );
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn session_info(&self) -> Option<&SessionInfo> {
        match &self.state {
            SessionState::Connected { info, .. } => Some(info),
            SessionState::Disconnected => None,
        }
    }

    /// Host of the last connect attempt.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Send a keepalive over the live session.
    pub fn ping(&mut self) -> XferResult<()> {
        let (raw, _, info) = self.state.live()?;
        self.transport.keepalive(raw).map_err(|e| {
            warn!("Keepalive failed for session {}: {}", info.id, e);
            XferError::InvalidHandle(e.to_string())
        })
    }
}

impl<T: Transport, L: LocalFs> Drop for SftpClient<T, L> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_state_fails_liveness() {
        let mut state: SessionState<u32, ()> = SessionState::Disconnected;
        assert!(!state.is_connected());
        assert!(matches!(state.live(), Err(XferError::NotConnected)));
    }

    #[test]
    fn live_state_counts_operations() {
        let now = Utc::now();
        let mut state = SessionState::Connected {
            raw: 1u32,
            fs: (),
            info: SessionInfo {
                id: "s".into(),
                host: "h".into(),
                port: DEFAULT_SSH_PORT,
                username: "u".into(),
                auth_mode: AuthMode::Password,
                connected_at: now,
                last_activity: now,
                bytes_uploaded: 0,
                bytes_downloaded: 0,
                operations_count: 0,
            },
        };

        state.live().unwrap();
        let (raw, _, info) = state.live().unwrap();
        assert_eq!(*raw, 1);
        assert_eq!(info.operations_count, 2);
    }
}
