// Shared HTTP client with transparent refresh-on-401 interception

use anyhow::anyhow;
use reqwest::header::{HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::{Client, Request, Response, StatusCode, Url};
use std::sync::Arc;

use crate::auth::RefreshCoordinator;
use crate::cookies::ACCESS_COOKIE;
use crate::credentials::CredentialStore;
use crate::error::ApiError;

const REFRESH_PATH: &str = "/api/auth/refresh";

/// The one client every fetcher sends through.
///
/// Two cross-cutting behaviors are attached: outbound requests to hosts
/// outside the session origin never carry session credentials, and a 401
/// on any request other than the refresh endpoint is recovered by
/// refreshing the access credential and reissuing the request exactly
/// once.
pub struct GatewayHttpClient {
    client: Client,
    store: CredentialStore,
    coordinator: Arc<RefreshCoordinator>,
    /// Origin whose endpoints participate in this application's session
    session_origin: String,
}

impl GatewayHttpClient {
    pub fn new(
        client: Client,
        store: CredentialStore,
        coordinator: Arc<RefreshCoordinator>,
        session_origin: &str,
    ) -> Self {
        Self {
            client,
            store,
            coordinator,
            session_origin: session_origin.trim_end_matches('/').to_string(),
        }
    }

    /// Get the underlying HTTP client, for building requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute a request with credential shaping and 401 recovery.
    ///
    /// Any response other than a recoverable 401 is returned unchanged,
    /// including a 401 on an already-retried request.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ApiError> {
        self.shape_outbound(&mut request);

        // Capture the request up front so it can be reissued after a
        // refresh; streaming bodies cannot be captured
        let retry_template = request.try_clone();

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let response = self.send(request, &url).await?;
        let status = response.status();
        tracing::debug!(status = %status, "Received HTTP response");

        if status != StatusCode::UNAUTHORIZED || self.is_refresh_endpoint(&url) {
            return Ok(response);
        }

        let Some(mut retry) = retry_template else {
            return Err(ApiError::Internal(anyhow!(
                "cannot replay {} {} after 401: request body is not cloneable",
                method,
                url
            )));
        };

        tracing::warn!(method = %method, url = %url, "Received 401, refreshing credentials");
        let token = self.coordinator.request_refreshed().await?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ApiError::Internal(anyhow!("invalid bearer header: {}", e)))?;
        retry.headers_mut().insert(AUTHORIZATION, bearer);
        if self.is_session_origin(retry.url()) {
            if let Ok(cookie) = HeaderValue::from_str(&format!("{}={}", ACCESS_COOKIE, token)) {
                retry.headers_mut().insert(COOKIE, cookie);
            }
        }

        // Reissue exactly once; a second 401 propagates to the caller
        tracing::debug!(method = %method, url = %url, "Reissuing request with refreshed credential");
        self.send(retry, &url).await
    }

    async fn send(&self, request: Request, url: &Url) -> Result<Response, ApiError> {
        self.client.execute(request).await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "HTTP request error");
            ApiError::Upstream {
                status: 502,
                message: format!("request to {} failed: {}", url, e),
            }
        })
    }

    /// Attach session credentials to same-origin requests; strip them from
    /// requests leaving for third-party hosts
    fn shape_outbound(&self, request: &mut Request) {
        if self.is_session_origin(request.url()) {
            if let Some(token) = self.store.access_token() {
                if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                    request.headers_mut().insert(AUTHORIZATION, bearer);
                }
                if let Ok(cookie) = HeaderValue::from_str(&format!("{}={}", ACCESS_COOKIE, token))
                {
                    request.headers_mut().insert(COOKIE, cookie);
                }
            }
        } else {
            request.headers_mut().remove(AUTHORIZATION);
            request.headers_mut().remove(COOKIE);
        }
    }

    fn is_session_origin(&self, url: &Url) -> bool {
        url.as_str().starts_with(&self.session_origin)
    }

    fn is_refresh_endpoint(&self, url: &Url) -> bool {
        self.is_session_origin(url) && url.path() == REFRESH_PATH
    }
}
