// Credential verification seam for the login endpoint

use crate::config::Config;

/// Decides whether a username/password pair is valid.
///
/// The login route depends only on this trait, so the mock pair can be
/// replaced by real verification without touching the refresh machinery.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Fixed-pair verifier backed by the configured mock credentials.
pub struct MockVerifier {
    username: String,
    password: String,
}

impl MockVerifier {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.mock_username, &config.mock_password)
    }
}

impl CredentialVerifier for MockVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}
