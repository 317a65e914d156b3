//! Pluggable persistence for the session token and failure counter.
//!
//! The guard owns exactly two pieces of durable state: the bearer token and
//! the consecutive-failure counter. Both live behind the `AuthStore` trait so
//! the console can swap the file-backed default for platform storage (or a
//! test double) without touching the guard.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auth state file name in the data directory
const STATE_FILE: &str = "auth.json";

/// Errors from a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Storage seam for the session guard.
///
/// An absent token means "not authenticated"; an absent counter reads as
/// zero. Each method is a single atomic read or write of one field; the
/// guard assumes one logical session, so no further locking is required.
pub trait AuthStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, StoreError>;
    fn set_token(&self, token: &str) -> Result<(), StoreError>;
    fn clear_token(&self) -> Result<(), StoreError>;
    fn failed_attempts(&self) -> Result<u32, StoreError>;
    fn set_failed_attempts(&self, count: u32) -> Result<(), StoreError>;
    fn clear_failed_attempts(&self) -> Result<(), StoreError>;
}

/// On-disk auth state. A missing file deserializes to the default:
/// signed out, zero failed attempts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AuthState {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    failed_attempts: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// File-backed store keeping both fields in one JSON state file.
#[derive(Debug, Clone)]
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    /// Create a store rooted at the given data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Result<AuthState, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AuthState::default()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    fn write_state(&self, mut state: AuthState) -> Result<(), StoreError> {
        state.updated_at = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut AuthState)) -> Result<(), StoreError> {
        let mut state = self.read_state()?;
        apply(&mut state);
        self.write_state(state)
    }
}

impl AuthStore for FileAuthStore {
    fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read_state()?.token)
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.update(|state| state.token = Some(token.to_string()))
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.update(|state| state.token = None)
    }

    fn failed_attempts(&self) -> Result<u32, StoreError> {
        Ok(self.read_state()?.failed_attempts)
    }

    fn set_failed_attempts(&self, count: u32) -> Result<(), StoreError> {
        self.update(|state| state.failed_attempts = count)
    }

    fn clear_failed_attempts(&self) -> Result<(), StoreError> {
        self.update(|state| state.failed_attempts = 0)
    }
}
