//! Session guard: login attempts, lockout, and the bearer-token lifecycle.
//!
//! The guard reconciles a locally persisted failure counter with
//! server-asserted lockout signals. Once the counter reaches the threshold,
//! further logins are refused without a network round-trip; a server-side
//! lockout (HTTP 423) is authoritative and is merged into the counter by
//! clamping it to the threshold, so local and remote state agree on the
//! next check.
//!
//! Every operation returns a structured result - store or transport
//! problems are absorbed here and never propagate to the caller.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::api::{ApiClient, LoginPayload};
use crate::config::Config;

use super::store::{AuthStore, FileAuthStore};

/// Consecutive failed logins before the account is considered locked.
/// Matches the server's own threshold, so the fast-fail path and a
/// server-asserted lockout describe the same state.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Fallback error codes for responses that carry no message
const ERROR_LOCKED: &str = "locked";
const ERROR_INVALID_CREDENTIALS: &str = "invalid_credentials";
const ERROR_NETWORK: &str = "network";

/// Outcome of one login attempt.
///
/// `locked` reflects the state after the attempt was accounted for: the
/// attempt that tips the counter over the threshold already reports
/// `locked: true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub success: bool,
    pub locked: bool,
    /// Server wants a one-time code before the session is fully usable
    pub requires_second_factor: bool,
    pub error: Option<String>,
}

impl LoginResult {
    fn accepted(requires_second_factor: bool) -> Self {
        Self {
            success: true,
            locked: false,
            requires_second_factor,
            error: None,
        }
    }

    fn locked_out() -> Self {
        Self {
            success: false,
            locked: true,
            requires_second_factor: false,
            error: None,
        }
    }

    fn rejected(locked: bool, error: String) -> Self {
        Self {
            success: false,
            locked,
            requires_second_factor: false,
            error: Some(error),
        }
    }

    fn network_failure() -> Self {
        Self {
            success: false,
            locked: false,
            requires_second_factor: false,
            error: Some(ERROR_NETWORK.to_string()),
        }
    }
}

/// Guards the console session: one identity, one token, one failure counter.
pub struct SessionGuard {
    client: ApiClient,
    store: Arc<dyn AuthStore>,
}

impl SessionGuard {
    pub fn new(client: ApiClient, store: Arc<dyn AuthStore>) -> Self {
        Self { client, store }
    }

    /// Build a guard from the console configuration: file-backed state in
    /// the app data directory, client pointed at the configured server.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.server_url_or_default())?;
        let store = FileAuthStore::new(config.data_dir()?);
        Ok(Self::new(client, Arc::new(store)))
    }

    // ===== Status queries (local reads, no network) =====

    /// Whether a session token is present. Token validity is not checked
    /// here; an expired token is reported as authenticated until the server
    /// rejects a request made with it.
    pub fn is_authenticated(&self) -> bool {
        self.read_token().is_some()
    }

    /// Consecutive failed login attempts since the last success
    pub fn failed_attempts(&self) -> u32 {
        match self.store.failed_attempts() {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "Failed to read attempt counter, treating as zero");
                0
            }
        }
    }

    pub fn is_locked(&self) -> bool {
        self.failed_attempts() >= MAX_LOGIN_ATTEMPTS
    }

    // ===== Lockout policy =====

    fn record_failure(&self) {
        let next = self.failed_attempts() + 1;
        self.write_attempts(next);
    }

    fn record_success(&self) {
        if let Err(err) = self.store.clear_failed_attempts() {
            warn!(error = %err, "Failed to reset attempt counter");
        }
    }

    /// Clamp the counter to the threshold after a server-asserted lockout,
    /// so the local fast-fail path agrees with the server from now on
    fn force_lock(&self) {
        self.write_attempts(MAX_LOGIN_ATTEMPTS);
    }

    fn write_attempts(&self, count: u32) {
        if let Err(err) = self.store.set_failed_attempts(count) {
            warn!(count, error = %err, "Failed to persist attempt counter");
        }
    }

    fn read_token(&self) -> Option<String> {
        match self.store.token() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Failed to read stored token");
                None
            }
        }
    }

    // ===== Login =====

    /// Attempt a credential login.
    ///
    /// If the account is already locked locally, this returns immediately
    /// without touching the network. Otherwise one request is made and its
    /// outcome classified, in priority order: accepted (token persisted,
    /// counter cleared), server lockout (counter clamped), rejection
    /// (counter incremented), or network failure (nothing mutated - an
    /// unreachable server is not evidence of a bad credential).
    pub async fn login(&self, username: &str, password: &str) -> LoginResult {
        if self.is_locked() {
            debug!(username, "Login refused, account locked locally");
            return LoginResult::locked_out();
        }

        let exchange = match self.client.login(username, password).await {
            Ok(exchange) => exchange,
            Err(err) => {
                warn!(username, error = %err, "Login request failed");
                return LoginResult::network_failure();
            }
        };

        if exchange.status.is_success() {
            if let Some(payload) = &exchange.payload {
                if payload.success {
                    if let Some(token) = payload.token() {
                        if let Err(err) = self.store.set_token(token) {
                            warn!(error = %err, "Failed to persist session token");
                        }
                        self.record_success();
                        debug!(username, "Login accepted");
                        return LoginResult::accepted(payload.requires_second_factor());
                    }
                }
            }
            // HTTP-ok but the payload didn't hold up (no success flag or no
            // token): falls through to the generic rejection branch.
        }

        if exchange.status == StatusCode::LOCKED {
            debug!(username, "Server reports account locked");
            self.force_lock();
            return LoginResult::rejected(true, error_message(&exchange.payload, ERROR_LOCKED));
        }

        self.record_failure();
        debug!(
            username,
            attempts = self.failed_attempts(),
            "Login rejected"
        );
        LoginResult::rejected(
            self.is_locked(),
            error_message(&exchange.payload, ERROR_INVALID_CREDENTIALS),
        )
    }

    // ===== Second factor =====

    /// Verify a one-time code with the server.
    ///
    /// Runs after an accepted first factor, carrying the stored token.
    /// Fails closed: any transport or parse problem reads as "not
    /// verified". Never touches the failure counter or the token.
    pub async fn verify_second_factor(&self, code: &str) -> bool {
        let client = match self.read_token() {
            Some(token) => self.client.with_token(token),
            None => self.client.clone(),
        };

        match client.verify_otp(code).await {
            Ok(verified) => verified,
            Err(err) => {
                debug!(error = %err, "Second-factor verification failed");
                false
            }
        }
    }

    // ===== Logout =====

    /// Terminate the local session.
    ///
    /// The stored token is removed first, unconditionally; if one was
    /// present, the server is notified on a detached task whose outcome is
    /// intentionally discarded and never observed by the caller. The
    /// authoritative effect of logout is the local token removal, so this
    /// operation cannot fail.
    pub async fn logout(&self) {
        let token = self.read_token();

        if let Err(err) = self.store.clear_token() {
            warn!(error = %err, "Failed to clear stored token");
        }

        if let Some(token) = token {
            let client = self.client.with_token(token);
            tokio::spawn(async move {
                if let Err(err) = client.logout().await {
                    debug!(error = %err, "Logout notification discarded");
                }
            });
        }
    }
}

/// Server-provided error message, or the fallback code when the payload is
/// absent or its message is empty
fn error_message(payload: &Option<LoginPayload>, fallback: &str) -> String {
    payload
        .as_ref()
        .and_then(|p| p.error.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_server_text() {
        let payload: LoginPayload =
            serde_json::from_str(r#"{"success": false, "error": "Account is locked"}"#).unwrap();
        assert_eq!(
            error_message(&Some(payload), ERROR_LOCKED),
            "Account is locked"
        );
    }

    #[test]
    fn error_message_falls_back_on_empty_or_missing() {
        let empty: LoginPayload =
            serde_json::from_str(r#"{"success": false, "error": ""}"#).unwrap();
        assert_eq!(
            error_message(&Some(empty), ERROR_INVALID_CREDENTIALS),
            ERROR_INVALID_CREDENTIALS
        );
        assert_eq!(error_message(&None, ERROR_LOCKED), ERROR_LOCKED);
    }
}
