//! Client core for the BotDeck media-bot admin console.
//!
//! This crate provides the pieces a console front-end needs to hold a
//! session with a BotDeck server:
//!
//! - `SessionGuard`: credential login with a local lockout (5 consecutive
//!   failures), bearer-token lifecycle, optional second-factor verification,
//!   and best-effort logout
//! - `ApiClient`: REST client for the server's `/api/auth` endpoints
//! - `AuthStore`: pluggable persistence for the token and failure counter
//! - `CredentialStore`: OS-keychain storage for remembered credentials
//! - `Config`: console configuration (server URL, last username)
//!
//! The guard handles exactly one session identity at a time and surfaces
//! every outcome as a structured result, never a propagated fault.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{AccountInfo, ApiClient, ApiError, TwoFactorSetup};
pub use auth::{
    AuthStore, CredentialStore, FileAuthStore, LoginResult, SessionGuard, StoreError,
    MAX_LOGIN_ATTEMPTS,
};
pub use config::Config;
