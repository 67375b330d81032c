//! Persistence of the bearer token between runs.
//!
//! The token is the only thing that outlives the process. It is written with
//! a one-day expiry and ignored once that passes.
use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_TOKEN_PATH: &str = "config/thing_ledger_token.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(rename = "auth_token")]
    pub token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// A token valid for one day from `now`.
    pub fn issued(token: String, user_id: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            expires_at: now + Duration::days(1),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub trait TokenStore {
    /// Returns the stored token, `None` if there is none or it expired.
    fn load(&self) -> Result<Option<StoredToken>>;
    fn save(&self, token: &StoredToken) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the token in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredToken>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stored: StoredToken = serde_json::from_str(&content)?;
        if stored.is_expired(Utc::now()) {
            tracing::info!("stored token expired");
            return Ok(None);
        }
        Ok(Some(stored))
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps the token for the lifetime of the value only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RefCell<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: StoredToken) -> Self {
        Self {
            inner: RefCell::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self
            .inner
            .borrow()
            .clone()
            .filter(|stored| !stored.is_expired(Utc::now())))
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        *self.inner.borrow_mut() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner.borrow_mut().take();
        Ok(())
    }
}

pub fn default_token_path() -> &'static str {
    DEFAULT_TOKEN_PATH
}
