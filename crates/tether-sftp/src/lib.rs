//! # Tether – SFTP
//!
//! Credential-driven SSH sessions with SFTP streaming transfers, SCP
//! whole-file copies and remote filesystem operations.

pub mod sftp;
