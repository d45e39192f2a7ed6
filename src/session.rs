//! Bearer-token persistence.
//!
//! The token is the only state shared between views. It is written by
//! login, logout, and authentication failures, and read on every request.
//! No format or expiry validation is performed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage backend for the session token.
pub trait SessionStore: Send + Sync {
    /// Current token, or `None` when signed out.
    fn get_token(&self) -> Option<String>;

    /// Persist `Some(token)` or clear with `None`.
    fn set_token(&self, token: Option<&str>) -> Result<()>;
}

/// On-disk layout: a single fixed `jwt` key.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    jwt: String,
}

/// Session persisted as a small JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get_token(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let file: SessionFile = serde_json::from_str(&content).ok()?;
        if file.jwt.is_empty() {
            None
        } else {
            Some(file.jwt)
        }
    }

    fn set_token(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(jwt) if !jwt.is_empty() => {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create session dir: {}", parent.display())
                    })?;
                }
                let body = serde_json::to_string(&SessionFile {
                    jwt: jwt.to_string(),
                })?;
                std::fs::write(&self.path, body).with_context(|| {
                    format!("Failed to write session file: {}", self.path.display())
                })?;
            }
            _ => {
                if self.path.exists() {
                    std::fs::remove_file(&self.path).with_context(|| {
                        format!("Failed to remove session file: {}", self.path.display())
                    })?;
                }
            }
        }
        Ok(())
    }
}

/// Process-local session, used by tests and embedders.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: Option<&str>) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *slot = token.filter(|t| !t.is_empty()).map(str::to_string);
        Ok(())
    }
}
