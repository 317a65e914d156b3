//! API client for the BotDeck server's auth endpoints.
//!
//! This module provides the `ApiClient` struct for talking to the server's
//! `/api/auth` surface: the login exchange, OTP verification, logout
//! notification, and the account/2FA-setup helpers the console settings
//! screens use.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for a slow self-hosted server while still failing fast.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login endpoint path
const LOGIN_PATH: &str = "/api/auth/login";

/// OTP verification endpoint path
const VERIFY_OTP_PATH: &str = "/api/auth/verify-otp";

/// Logout notification endpoint path
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Current-account endpoint path
const ME_PATH: &str = "/api/auth/me";

/// Two-factor setup endpoint path
const SETUP_2FA_PATH: &str = "/api/auth/setup-2fa";

// ============================================================================
// Wire types
// ============================================================================

/// Raw result of one login exchange: the HTTP status plus the payload, if
/// the body parsed as JSON. A body that fails to parse is reported as an
/// absent payload, not an error - only transport failures are errors here.
#[derive(Debug, Clone)]
pub struct LoginExchange {
    pub status: StatusCode,
    pub payload: Option<LoginPayload>,
}

/// Login response body: `{success, data?: {token, username, requires2FA}, error?}`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<LoginData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "requires2FA", default)]
    pub requires_two_factor: bool,
}

impl LoginPayload {
    /// The issued bearer token, if the payload carries one
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.token.as_deref())
    }

    /// Whether the server wants a one-time code after this login
    pub fn requires_second_factor(&self) -> bool {
        self.data
            .as_ref()
            .map(|d| d.requires_two_factor)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct VerifyOtpPayload {
    #[serde(default)]
    success: bool,
}

/// Generic `{success, data?, error?}` envelope for the remaining endpoints
#[derive(Debug, Clone, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

/// Current account info from `/api/auth/me`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "twoFactorEnabled", default)]
    pub two_factor_enabled: bool,
}

/// Result of a 2FA enrollment from `/api/auth/setup-2fa`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwoFactorSetup {
    pub secret: String,
    #[serde(rename = "qrCodeUri")]
    pub qr_code_uri: String,
}

// ============================================================================
// Client
// ============================================================================

/// API client for a BotDeck server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: trim_base_url(base_url.into()),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, when one is set
    fn maybe_bearer(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if a response is successful, turning the body into an error if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    // ===== Auth operations =====

    /// Perform one credential exchange against the login endpoint.
    ///
    /// Transport failures surface as `ApiError::Network`; everything the
    /// server actually said - any status, any body - comes back as a
    /// `LoginExchange` for the session guard to classify.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginExchange, ApiError> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload = match serde_json::from_str::<LoginPayload>(&text) {
            Ok(payload) => Some(payload),
            Err(err) => {
                debug!(%status, error = %err, "Login response body is not JSON");
                None
            }
        };

        Ok(LoginExchange { status, payload })
    }

    /// Submit a one-time code for verification.
    ///
    /// Returns the server's verdict: true only for a 2xx response whose
    /// payload says `success: true`.
    pub async fn verify_otp(&self, code: &str) -> Result<bool, ApiError> {
        let response = self
            .maybe_bearer(self.client.post(self.url(VERIFY_OTP_PATH)))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let verified = status.is_success()
            && serde_json::from_str::<VerifyOtpPayload>(&text)
                .map(|p| p.success)
                .unwrap_or(false);

        debug!(%status, verified, "OTP verification response");
        Ok(verified)
    }

    /// Notify the server that this session is over. The response body is
    /// ignored; a non-2xx status still comes back as an error so callers
    /// can decide whether they care.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .maybe_bearer(self.client.post(self.url(LOGOUT_PATH)))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Account helpers =====

    /// Fetch the current account info
    pub async fn me(&self) -> Result<AccountInfo, ApiError> {
        let response = self
            .maybe_bearer(self.client.get(self.url(ME_PATH)))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let envelope: Envelope<AccountInfo> = response.json().await?;
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("Account response missing data".to_string()))
    }

    /// Enroll a new two-factor secret, returning it with its QR code URI
    pub async fn setup_two_factor(&self) -> Result<TwoFactorSetup, ApiError> {
        let response = self
            .maybe_bearer(self.client.post(self.url(SETUP_2FA_PATH)))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let envelope: Envelope<TwoFactorSetup> = response.json().await?;
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("2FA setup response missing data".to_string()))
    }
}

/// Normalize a configured base URL so path joining stays predictable
fn trim_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}
