// Session context
// Process-wide authentication state with an explicit lifecycle

use reqwest::header::SET_COOKIE;
use reqwest::Client;
use std::sync::RwLock;

use super::redirect::LoginRedirect;
use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::models::auth::{LoginRequest, LoginResponse, MessageResponse};

const LOGIN_FALLBACK_MESSAGE: &str = "Error logging in";

struct SessionState {
    access_token: Option<String>,
    initialized: bool,
}

/// Authentication state for the lifetime of the process.
///
/// Construction reads the stored access credential synchronously so
/// consumers never observe a spurious unauthenticated state before the
/// first lifecycle pass runs.
pub struct SessionContext {
    client: Client,
    store: CredentialStore,
    auth_base_url: String,
    redirect: LoginRedirect,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(
        client: Client,
        store: CredentialStore,
        auth_base_url: &str,
        redirect: LoginRedirect,
    ) -> Self {
        // Seed state from the store up front
        let access_token = store.access_token();
        Self {
            client,
            store,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            redirect,
            state: RwLock::new(SessionState {
                access_token,
                initialized: false,
            }),
        }
    }

    /// One confirmation pass against the store, after which consumers may
    /// render. Mirrors the effect-driven check the initial seed cannot
    /// perform.
    pub fn initialize(&self) {
        let token = self.store.access_token();
        let mut state = self.write_state();
        state.access_token = token;
        state.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().access_token.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_state().access_token.clone()
    }

    /// Authenticate against the login endpoint.
    ///
    /// On success the returned access token is kept in session state and
    /// the endpoint's `Set-Cookie` side channel is mirrored into the
    /// credential store.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/auth/login", self.auth_base_url);
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Login request failed: {}", e);
                ApiError::Auth(LOGIN_FALLBACK_MESSAGE.to_string())
            })?;

        if !response.status().is_success() {
            let message = response
                .json::<MessageResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| LOGIN_FALLBACK_MESSAGE.to_string());
            return Err(ApiError::Auth(message));
        }

        // Mirror the cookie side channel into the store before parsing the
        // body, so a decode failure cannot leave the jar half-updated
        self.absorb_cookies(response.headers());

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|_| ApiError::Auth(LOGIN_FALLBACK_MESSAGE.to_string()))?;

        self.store.set_access_token(&body.access_token);
        self.write_state().access_token = Some(body.access_token);

        tracing::info!("Login successful");
        Ok(())
    }

    /// End the session.
    ///
    /// Remote invalidation is best-effort: a failing logout endpoint is
    /// logged, but local credentials and session state are cleared
    /// unconditionally and navigation to the login entry point is
    /// requested.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = format!("{}/api/auth/logout", self.auth_base_url);

        match self.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("Logout successful");
            }
            Ok(response) => {
                tracing::warn!("Logout endpoint returned {}", response.status());
            }
            Err(e) => {
                tracing::warn!("Logout request failed: {}", e);
            }
        }

        self.store.clear();
        self.write_state().access_token = None;
        self.redirect.signal();

        Ok(())
    }

    /// Copy session cookies from a response into the credential store
    fn absorb_cookies(&self, headers: &reqwest::header::HeaderMap) {
        for header in headers.get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            let Some(pair) = raw.split(';').next() else { continue };
            let Some((name, value)) = pair.split_once('=') else { continue };
            match name.trim() {
                ACCESS_COOKIE => self.store.set_access_token(value),
                REFRESH_COOKIE => self.store.set_refresh_token(value),
                _ => {}
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
