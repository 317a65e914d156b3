use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for remembered console credentials
const SERVICE_NAME: &str = "botdeck";

/// OS-keychain storage for the console's "remember me" login prefill.
///
/// Independent of the session guard: credentials are only read back to
/// pre-fill the login form, never consulted during lockout decisions.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    service: Option<String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default keychain service name (one console per server)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
        }
    }

    fn entry(&self, username: &str) -> Result<Entry> {
        let service = self.service.as_deref().unwrap_or(SERVICE_NAME);
        Entry::new(service, username).context("Failed to create keyring entry")
    }

    /// Store username and password in the OS keychain
    pub fn store(&self, username: &str, password: &str) -> Result<()> {
        self.entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the password for a username from the OS keychain
    pub fn get_password(&self, username: &str) -> Result<String> {
        self.entry(username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for a username
    pub fn delete(&self, username: &str) -> Result<()> {
        self.entry(username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check whether credentials exist for a username
    pub fn has_credentials(&self, username: &str) -> bool {
        self.entry(username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
