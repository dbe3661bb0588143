// Client-side credential store
// Mirrors the cookie jar a browser session would hold

use dashmap::DashMap;
use std::sync::Arc;

use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};

/// Thread-safe store for the two session credentials.
///
/// The access credential is a short-lived bearer token attached to
/// authenticated requests; the refresh credential is only ever sent to the
/// refresh endpoint.
#[derive(Clone)]
pub struct CredentialStore {
    entries: Arc<DashMap<String, String>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Get the current access credential
    pub fn access_token(&self) -> Option<String> {
        self.entries.get(ACCESS_COOKIE).map(|e| e.value().clone())
    }

    /// Get the current refresh credential
    pub fn refresh_token(&self) -> Option<String> {
        self.entries.get(REFRESH_COOKIE).map(|e| e.value().clone())
    }

    /// Store a new access credential
    pub fn set_access_token(&self, token: &str) {
        self.entries
            .insert(ACCESS_COOKIE.to_string(), token.to_string());
    }

    /// Store a new refresh credential
    pub fn set_refresh_token(&self, token: &str) {
        self.entries
            .insert(REFRESH_COOKIE.to_string(), token.to_string());
    }

    /// Store both credentials at once (after login)
    pub fn set_pair(&self, access_token: &str, refresh_token: &str) {
        self.set_access_token(access_token);
        self.set_refresh_token(refresh_token);
    }

    /// Remove both credentials (after logout or a failed refresh)
    pub fn clear(&self) {
        self.entries.remove(ACCESS_COOKIE);
        self.entries.remove(REFRESH_COOKIE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = CredentialStore::new();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_set_and_get() {
        let store = CredentialStore::new();
        store.set_access_token("access-1");
        store.set_refresh_token("refresh-1");
        assert_eq!(store.access_token(), Some("access-1".to_string()));
        assert_eq!(store.refresh_token(), Some("refresh-1".to_string()));
    }

    #[test]
    fn test_set_pair_and_clear() {
        let store = CredentialStore::new();
        store.set_pair("access-1", "refresh-1");
        assert!(store.access_token().is_some());
        assert!(store.refresh_token().is_some());

        store.clear();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_overwrite_access_token() {
        let store = CredentialStore::new();
        store.set_access_token("old");
        store.set_access_token("new");
        assert_eq!(store.access_token(), Some("new".to_string()));
    }

    #[test]
    fn test_clones_share_state() {
        let store = CredentialStore::new();
        let other = store.clone();
        store.set_access_token("shared");
        assert_eq!(other.access_token(), Some("shared".to_string()));
    }
}
