// ── Credentials – identity material and authorization ───────────────────────

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tether_core::{Authenticator, KeyPair, NoneAuth, XferError, XferResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    None,
    Password,
    PublicKey,
    /// Public key first, then password; the password step decides.
    Both,
}

impl AuthMode {
    fn needs_password(self) -> bool {
        matches!(self, AuthMode::Password | AuthMode::Both)
    }

    fn needs_keys(self) -> bool {
        matches!(self, AuthMode::PublicKey | AuthMode::Both)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::None => "none",
            AuthMode::Password => "password",
            AuthMode::PublicKey => "publickey",
            AuthMode::Both => "publickey+password",
        };
        f.write_str(name)
    }
}

// ── Authorization steps ──────────────────────────────────────────────────────

/// A single method attempted against the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    None,
    Password,
    PublicKey,
}

/// Run `first` for its side effects only, then return whatever `then` yields.
///
/// The outcome of `first` (success, rejection or error) is never observable
/// by the caller; it is logged at debug level and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryThenFallback {
    pub first: AuthStep,
    pub then: AuthStep,
}

impl TryThenFallback {
    pub fn run<A: Authenticator>(
        &self,
        creds: &Credentials,
        auth: &A,
        session: &A::Session,
    ) -> XferResult<bool> {
        match creds.attempt(self.first, auth, session) {
            Ok(accepted) => debug!(
                "{:?} step for '{}' finished (accepted: {}), falling back to {:?}",
                self.first,
                creds.username().unwrap_or_default(),
                accepted,
                self.then
            ),
            Err(e) => debug!("{:?} step discarded: {}", self.first, e),
        }
        creds.attempt(self.then, auth, session)
    }
}

enum Strategy {
    Single(AuthStep),
    Fallback(TryThenFallback),
}

impl From<AuthMode> for Strategy {
    fn from(mode: AuthMode) -> Self {
        match mode {
            AuthMode::None => Strategy::Single(AuthStep::None),
            AuthMode::Password => Strategy::Single(AuthStep::Password),
            AuthMode::PublicKey => Strategy::Single(AuthStep::PublicKey),
            AuthMode::Both => Strategy::Fallback(TryThenFallback {
                first: AuthStep::PublicKey,
                then: AuthStep::Password,
            }),
        }
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: Option<String>,
    mode: Option<AuthMode>,
    password: Option<String>,
    public_key: Option<PathBuf>,
    private_key: Option<PathBuf>,
    passphrase: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("mode", &self.mode)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Empty credentials; fill them in with the setters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_none(username: &str) -> XferResult<Self> {
        let mut creds = Self::new();
        creds.set_mode(AuthMode::None).set_username(username)?;
        Ok(creds)
    }

    pub fn with_password(username: &str, password: &str) -> XferResult<Self> {
        let mut creds = Self::new();
        creds
            .set_mode(AuthMode::Password)
            .set_username(username)?
            .set_password(password);
        Ok(creds)
    }

    pub fn with_public_key(
        username: &str,
        public_key: impl AsRef<Path>,
        private_key: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> XferResult<Self> {
        let mut creds = Self::new();
        creds
            .set_mode(AuthMode::PublicKey)
            .set_username(username)?
            .set_public_key(public_key)?
            .set_private_key(private_key, passphrase)?;
        Ok(creds)
    }

    pub fn with_both(
        username: &str,
        password: &str,
        public_key: impl AsRef<Path>,
        private_key: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> XferResult<Self> {
        let mut creds = Self::new();
        creds
            .set_mode(AuthMode::Both)
            .set_username(username)?
            .set_password(password)
            .set_public_key(public_key)?
            .set_private_key(private_key, passphrase)?;
        Ok(creds)
    }

    /// Public-key credentials using the first default identity in `~/.ssh`.
    pub fn with_default_identity(username: &str) -> XferResult<Self> {
        let keys = KeyPair::default_identity()
            .ok_or_else(|| XferError::FileNotFound("no default identity in ~/.ssh".into()))?;
        Self::with_public_key(
            username,
            &keys.public_key,
            &keys.private_key,
            keys.passphrase.as_deref(),
        )
    }

    // ── Setters ──────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: AuthMode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    pub fn set_username(&mut self, username: &str) -> XferResult<&mut Self> {
        if username.is_empty() {
            return Err(XferError::validation(
                "username must be at least 1 character long",
            ));
        }
        self.username = Some(username.to_string());
        Ok(self)
    }

    /// An empty string is a valid password, distinct from no password.
    pub fn set_password(&mut self, password: &str) -> &mut Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn set_public_key(&mut self, path: impl AsRef<Path>) -> XferResult<&mut Self> {
        self.public_key = Some(existing(path.as_ref(), "public key")?);
        Ok(self)
    }

    pub fn set_private_key(
        &mut self,
        path: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> XferResult<&mut Self> {
        self.private_key = Some(existing(path.as_ref(), "private key")?);
        self.passphrase = passphrase.map(str::to_string);
        Ok(self)
    }

    // ── Getters ──────────────────────────────────────────────────────────

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn mode(&self) -> Option<AuthMode> {
        self.mode
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn public_key(&self) -> Option<&Path> {
        self.public_key.as_deref()
    }

    pub fn private_key(&self) -> Option<&Path> {
        self.private_key.as_deref()
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    // ── Validation & authorization ───────────────────────────────────────

    /// Check that everything the declared mode needs is present.
    pub fn validate(&self) -> XferResult<()> {
        if self.username.is_none() {
            return Err(XferError::validation("username not set"));
        }
        let mode = self
            .mode
            .ok_or_else(|| XferError::validation("authentication mode not set"))?;

        if mode.needs_password() && self.password.is_none() {
            return Err(XferError::validation(format!(
                "password required for {} mode",
                mode
            )));
        }
        if mode.needs_keys() {
            if self.public_key.is_none() {
                return Err(XferError::validation(format!(
                    "public key required for {} mode",
                    mode
                )));
            }
            if self.private_key.is_none() {
                return Err(XferError::validation(format!(
                    "private key required for {} mode",
                    mode
                )));
            }
        }
        Ok(())
    }

    /// Apply these credentials to a raw, unauthenticated session.
    ///
    /// Validation runs on every call and fails before the authenticator is
    /// touched. Transport failures surface as `Auth`.
    pub fn authorize<A: Authenticator>(&self, auth: &A, session: &A::Session) -> XferResult<bool> {
        self.validate()?;
        let mode = self
            .mode
            .ok_or_else(|| XferError::validation("authentication mode not set"))?;

        info!(
            "Authorizing '{}' via {}",
            self.username().unwrap_or_default(),
            mode
        );

        match Strategy::from(mode) {
            Strategy::Single(step) => self.attempt(step, auth, session),
            Strategy::Fallback(strategy) => strategy.run(self, auth, session),
        }
    }

    fn attempt<A: Authenticator>(
        &self,
        step: AuthStep,
        auth: &A,
        session: &A::Session,
    ) -> XferResult<bool> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| XferError::validation("username not set"))?;

        let result = match step {
            AuthStep::None => auth
                .auth_none(session, username)
                .map(|outcome| outcome == NoneAuth::Authenticated),
            AuthStep::Password => {
                let password = self
                    .password
                    .as_deref()
                    .ok_or_else(|| XferError::validation("password not set"))?;
                auth.auth_password(session, username, password)
            }
            AuthStep::PublicKey => {
                let keys = self
                    .key_pair()
                    .ok_or_else(|| XferError::validation("key pair not set"))?;
                auth.auth_public_key(session, username, &keys)
            }
        };

        result.map_err(|e| XferError::Auth(format!("{:?} authentication failed: {}", step, e)))
    }

    pub fn key_pair(&self) -> Option<KeyPair> {
        Some(KeyPair {
            public_key: self.public_key.clone()?,
            private_key: self.private_key.clone()?,
            passphrase: self.passphrase.clone(),
        })
    }
}

fn existing(path: &Path, what: &str) -> XferResult<PathBuf> {
    if !path.exists() {
        return Err(XferError::FileNotFound(format!(
            "{} file '{}' does not exist",
            what,
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}
