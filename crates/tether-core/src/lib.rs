//! # Tether – core
//!
//! Shared building blocks for the tether transfer client:
//!   • Typed error hierarchy ([`error::XferError`])
//!   • Stat types for remote and local paths
//!   • Collaborator traits the client drives (transport, remote fs, local fs)
//!   • Remote path helpers

pub mod error;
pub mod local;
pub mod paths;
pub mod transport;
pub mod types;

pub use error::{ErrorKind, StreamSide, XferError, XferResult};
pub use local::{LocalFs, StdFs};
pub use transport::{Authenticator, KeyPair, NoneAuth, RemoteDir, RemoteFs, Transport};
pub use types::{EntryType, FileStat};
