//! Authentication module for managing the console session.
//!
//! This module provides:
//! - `SessionGuard`: login attempt tracking with a local lockout and the
//!   bearer-token lifecycle it gates
//! - `AuthStore`: pluggable persistence for the token and failure counter,
//!   with a file-backed default
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! Lockout trips after 5 consecutive failed logins and is enforced locally;
//! a server-asserted lockout (HTTP 423) is synchronized into the counter.

pub mod credentials;
pub mod guard;
pub mod store;

pub use credentials::CredentialStore;
pub use guard::{LoginResult, SessionGuard, MAX_LOGIN_ATTEMPTS};
pub use store::{AuthStore, FileAuthStore, StoreError};
