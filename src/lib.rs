//! # Tether
//!
//! Blocking SFTP/SCP client library.
//!
//! ```no_run
//! use tether::{Credentials, SftpClient, Ssh2Transport, DEFAULT_SSH_PORT};
//!
//! # fn main() -> tether::XferResult<()> {
//! let mut client = SftpClient::new(Ssh2Transport::default())?;
//! client
//!     .set_credentials(Credentials::with_password("deploy", "secret")?)
//!     .set_remote_prefix("/srv/releases/")
//!     .set_verify_size(true);
//! client.connect("files.example.org", DEFAULT_SSH_PORT)?;
//! client.upload("build/app.tar.gz", None)?;
//! client.close();
//! # Ok(())
//! # }
//! ```

pub use tether_core::paths;
pub use tether_sftp::sftp;

pub use tether_core::{
    Authenticator, EntryType, ErrorKind, FileStat, KeyPair, LocalFs, NoneAuth, RemoteDir,
    RemoteFs, StdFs, StreamSide, Transport, XferError, XferResult,
};
pub use tether_sftp::sftp::{
    AuthMode, ClientOptions, Credentials, SessionInfo, SftpClient, ShortReadPolicy, Ssh2Config,
    Ssh2Transport, TransferDirection, TransferReport, DEFAULT_DIR_MODE, DEFAULT_SSH_PORT,
};
