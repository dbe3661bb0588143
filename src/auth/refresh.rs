// Single-flight credential refresh

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::redirect::LoginRedirect;
use crate::cookies::REFRESH_COOKIE;
use crate::credentials::CredentialStore;
use crate::error::RefreshError;
use crate::models::auth::{MessageResponse, RefreshResponse};

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Coordinates credential refresh so that any number of requests failing
/// authorization at the same time produce exactly one refresh call.
///
/// The first caller installs a shared future into the gate and drives the
/// network call; every caller arriving while it is in flight awaits the
/// same outcome. The gate resets as soon as the attempt settles, so a
/// later 401 starts a fresh cycle instead of observing a stale result.
pub struct RefreshCoordinator {
    /// Plain client for the refresh call itself; the refresh endpoint must
    /// never go through 401 interception
    client: Client,

    /// Shared credential store, updated on success and cleared on failure
    store: CredentialStore,

    /// Origin of the authentication endpoints
    auth_base_url: String,

    /// Bounded wait for one refresh attempt
    timeout: Duration,

    /// Raised when a refresh fails and the session must re-authenticate
    redirect: LoginRedirect,

    /// The single-flight gate: `Some` while a refresh is in flight
    in_flight: Mutex<Option<SharedRefresh>>,
}

impl RefreshCoordinator {
    pub fn new(
        client: Client,
        store: CredentialStore,
        auth_base_url: &str,
        timeout: Duration,
        redirect: LoginRedirect,
    ) -> Self {
        Self {
            client,
            store,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            timeout,
            redirect,
            in_flight: Mutex::new(None),
        }
    }

    /// Obtain a freshly minted access credential.
    ///
    /// Joins the in-flight refresh if one exists, otherwise starts one. On
    /// success the store's access credential is updated and every waiter
    /// resolves with the new token; on failure the store is cleared, the
    /// login redirect is signalled, and every waiter receives the same
    /// error.
    pub async fn request_refreshed(self: &Arc<Self>) -> Result<String, RefreshError> {
        let fut = {
            // The gate is checked-and-set atomically; the lock is never
            // held across an await
            let mut slot = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if let Some(existing) = slot.as_ref() {
                tracing::debug!("Refresh already in flight, joining pending outcome");
                existing.clone()
            } else {
                tracing::debug!("Starting credential refresh");
                let this = Arc::clone(self);
                let fut: SharedRefresh = async move {
                    let result = this.refresh_once().await;

                    // Reset the gate before publishing side effects so the
                    // next 401 triggers a new, independent attempt
                    this.in_flight
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .take();

                    match &result {
                        Ok(token) => {
                            tracing::info!("Credential refresh succeeded");
                            this.store.set_access_token(token);
                        }
                        Err(err) => {
                            tracing::warn!("Credential refresh failed: {}", err);
                            this.store.clear();
                            this.redirect.signal();
                        }
                    }

                    result
                }
                .boxed()
                .shared();

                *slot = Some(fut.clone());
                fut
            }
        };

        fut.await
    }

    /// Execute one refresh call against the refresh endpoint.
    ///
    /// The refresh credential travels only here, as the `refreshToken`
    /// cookie; it is never attached to ordinary requests.
    async fn refresh_once(&self) -> Result<String, RefreshError> {
        let url = format!("{}/api/auth/refresh", self.auth_base_url);

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.store.refresh_token() {
            request = request.header(COOKIE, format!("{}={}", REFRESH_COOKIE, token));
        }

        let attempt = async {
            let response = request
                .send()
                .await
                .map_err(|e| RefreshError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .json::<MessageResponse>()
                    .await
                    .map(|body| body.message)
                    .unwrap_or_else(|_| format!("refresh endpoint returned {}", status));
                return Err(RefreshError::Rejected(message));
            }

            let body: RefreshResponse = response
                .json()
                .await
                .map_err(|e| RefreshError::Network(format!("invalid refresh response: {}", e)))?;

            if body.new_access_token.is_empty() {
                return Err(RefreshError::Network(
                    "refresh response missing newAccessToken".to_string(),
                ));
            }

            Ok(body.new_access_token)
        };

        tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| RefreshError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    fn coordinator_for(url: &str, timeout_ms: u64) -> (Arc<RefreshCoordinator>, CredentialStore, LoginRedirect) {
        let store = CredentialStore::new();
        store.set_pair("stale-access", "old-refresh");
        let redirect = LoginRedirect::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            Client::new(),
            store.clone(),
            url,
            Duration::from_millis(timeout_ms),
            redirect.clone(),
        ));
        (coordinator, store, redirect)
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/refresh")
            .match_header("cookie", "refreshToken=old-refresh")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Token refreshed","newAccessToken":"fresh-token"}"#)
            .expect(1)
            .create_async()
            .await;

        let (coordinator, store, _) = coordinator_for(&server.url(), 5000);

        // All callers start within one scheduling pass, before the network
        // response can arrive
        let calls = (0..8).map(|_| {
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.request_refreshed().await }
        });
        let results = join_all(calls).await;

        for result in results {
            assert_eq!(result, Ok("fresh-token".to_string()));
        }
        assert_eq!(store.access_token(), Some("fresh-token".to_string()));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gate_resets_after_settling() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/refresh")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Token refreshed","newAccessToken":"fresh-token"}"#)
            .expect(2)
            .create_async()
            .await;

        let (coordinator, _, _) = coordinator_for(&server.url(), 5000);

        // Two independent cycles issue two network calls
        assert!(coordinator.request_refreshed().await.is_ok());
        assert!(coordinator.request_refreshed().await.is_ok());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failure_rejects_all_waiters_and_clears_store() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/refresh")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Invalid refresh token"}"#)
            .expect(1)
            .create_async()
            .await;

        let (coordinator, store, redirect) = coordinator_for(&server.url(), 5000);
        let rx = redirect.subscribe();

        let calls = (0..4).map(|_| {
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.request_refreshed().await }
        });
        let results = join_all(calls).await;

        for result in results {
            assert_eq!(
                result,
                Err(RefreshError::Rejected("Invalid refresh token".to_string()))
            );
        }

        // Failure clears both credentials and demands re-authentication
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(*rx.borrow());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_gate_does_not_latch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/refresh")
            .with_status(401)
            .with_body(r#"{"message":"Invalid refresh token"}"#)
            .expect(2)
            .create_async()
            .await;

        let (coordinator, _, _) = coordinator_for(&server.url(), 5000);

        // A failed cycle must not prevent a later attempt from running
        assert!(coordinator.request_refreshed().await.is_err());
        assert!(coordinator.request_refreshed().await.is_err());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_times_out() {
        // A listener that accepts and then never responds
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let (coordinator, store, _) = coordinator_for(&format!("http://{}", addr), 200);

        let result = coordinator.request_refreshed().await;
        assert_eq!(result, Err(RefreshError::Timeout));
        assert_eq!(store.access_token(), None);
    }

    #[tokio::test]
    async fn test_missing_refresh_credential_still_calls_endpoint() {
        // The server decides validity; an empty jar just means no cookie
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/refresh")
            .match_header("cookie", mockito::Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"message":"Invalid refresh token"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = CredentialStore::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            Client::new(),
            store,
            &server.url(),
            Duration::from_secs(5),
            LoginRedirect::new(),
        ));

        let result = coordinator.request_refreshed().await;
        assert!(matches!(result, Err(RefreshError::Rejected(_))));

        mock.assert_async().await;
    }
}
