//! REST API client module for a BotDeck server.
//!
//! This module provides the `ApiClient` for communicating with the server's
//! `/api/auth` endpoints: credential login, OTP verification, logout, and
//! the account helpers used by the console settings screens.
//!
//! The API uses JWT bearer token authentication issued by the login
//! endpoint; the `SessionGuard` in `crate::auth` owns that token.

pub mod client;
pub mod error;

pub use client::{AccountInfo, ApiClient, LoginData, LoginExchange, LoginPayload, TwoFactorSetup};
pub use error::ApiError;
