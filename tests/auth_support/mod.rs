#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use botdeck_core::{ApiClient, AuthStore, SessionGuard, StoreError};
use wiremock::MockServer;

/// In-memory `AuthStore` double mirroring localStorage semantics:
/// infallible, single-consumer, one value per field.
#[derive(Default)]
pub struct MemoryAuthStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    token: Option<String>,
    failed_attempts: u32,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attempts(count: u32) -> Arc<Self> {
        let store = Self::new();
        store.state.lock().expect("store lock poisoned").failed_attempts = count;
        Arc::new(store)
    }

    pub fn with_token(token: &str) -> Arc<Self> {
        let store = Self::new();
        store.state.lock().expect("store lock poisoned").token = Some(token.to_string());
        Arc::new(store)
    }

    pub fn stored_token(&self) -> Option<String> {
        self.state.lock().expect("store lock poisoned").token.clone()
    }

    pub fn stored_attempts(&self) -> u32 {
        self.state.lock().expect("store lock poisoned").failed_attempts
    }
}

impl AuthStore for MemoryAuthStore {
    fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.stored_token())
    }

    fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.state.lock().expect("store lock poisoned").token = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.state.lock().expect("store lock poisoned").token = None;
        Ok(())
    }

    fn failed_attempts(&self) -> Result<u32, StoreError> {
        Ok(self.stored_attempts())
    }

    fn set_failed_attempts(&self, count: u32) -> Result<(), StoreError> {
        self.state.lock().expect("store lock poisoned").failed_attempts = count;
        Ok(())
    }

    fn clear_failed_attempts(&self) -> Result<(), StoreError> {
        self.state.lock().expect("store lock poisoned").failed_attempts = 0;
        Ok(())
    }
}

/// Guard wired to a mock server
pub fn session_guard(server: &MockServer, store: Arc<MemoryAuthStore>) -> SessionGuard {
    let client = ApiClient::new(server.uri()).expect("build client");
    SessionGuard::new(client, store)
}

/// Guard pointed at an address nothing listens on, for transport-failure
/// paths. Port 1 is reserved; connections are refused immediately.
pub fn unreachable_guard(store: Arc<MemoryAuthStore>) -> SessionGuard {
    let client = ApiClient::new("http://127.0.0.1:1").expect("build client");
    SessionGuard::new(client, store)
}
