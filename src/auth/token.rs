//! OAuth tokens and the slot they are persisted in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// An OAuth access token with its refresh token.
///
/// Secrets are held as [`SecretString`] and redacted from `Debug` output.
#[derive(Clone)]
pub struct Token {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    /// Usually `bearer`
    pub token_type: String,
    /// Lifetime in seconds, counted from `created_at`
    pub expires_in: i64,
    /// Issue time as a unix timestamp
    pub created_at: i64,
    /// Granted scope
    pub scope: Option<String>,
}

/// Wire and storage shape of a token.
#[derive(Serialize, Deserialize)]
struct RawToken {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Token {
    /// Create a token issued now.
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: None,
            token_type: default_token_type(),
            expires_in,
            created_at: Utc::now().timestamp(),
            scope: None,
        }
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(SecretString::from(refresh_token.into()));
        self
    }

    /// Decode a `/oauth/token` or `/oauth/device/token` response. A missing
    /// `created_at` is taken as now.
    pub fn from_json(data: &Value) -> Result<Self> {
        let raw = RawToken::deserialize(data)
            .map_err(|e| Error::Decode(format!("invalid token response: {}", e)))?;
        Ok(raw.into())
    }

    /// The access token.
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// The refresh token, if one was issued.
    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    /// When the access token stops being valid. Lifetimes beyond what a
    /// timestamp can hold saturate at [`DateTime::<Utc>::MAX_UTC`].
    pub fn expires_at(&self) -> DateTime<Utc> {
        let issued = DateTime::from_timestamp(self.created_at, 0).unwrap_or_default();
        Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| issued.checked_add_signed(lifetime))
            .unwrap_or(if self.expires_in < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            })
    }

    /// Check whether the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    fn to_raw(&self) -> RawToken {
        RawToken {
            access_token: self.access_token.expose_secret().to_string(),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            token_type: self.token_type.clone(),
            expires_in: self.expires_in,
            created_at: Some(self.created_at),
            scope: self.scope.clone(),
        }
    }
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            refresh_token: raw.refresh_token.map(SecretString::from),
            token_type: raw.token_type,
            expires_in: raw.expires_in,
            created_at: raw.created_at.unwrap_or_else(|| Utc::now().timestamp()),
            scope: raw.scope,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at())
            .field("scope", &self.scope)
            .finish()
    }
}

/// Persistent single-slot storage for the session token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> Result<Option<Token>>;

    /// Replace the stored token.
    fn save(&self, token: &Token) -> Result<()>;

    /// Remove the stored token.
    fn clear(&self) -> Result<()>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`.
    pub fn with_token(token: Token) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Token>>> {
        self.slot
            .lock()
            .map_err(|_| Error::Storage("token slot lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &Token) -> Result<()> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        let raw: RawToken = serde_json::from_slice(&contents)?;
        Ok(Some(raw.into()))
    }

    fn save(&self, token: &Token) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&token.to_raw())?;
        std::fs::write(&self.path, contents).map_err(|e| storage_error(&self.path, e))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> Error {
    Error::Storage(format!("{}: {}", path.display(), err))
}
