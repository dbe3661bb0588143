// Character-image lookup against the Databank API

use std::sync::Arc;

use crate::http_client::GatewayHttpClient;
use crate::models::catalog::DatabankCharacter;

/// Client for the character-image lookup API.
///
/// Lookup is best-effort: any failure degrades to `None` so the consumer
/// can render a placeholder instead of an error.
pub struct DatabankClient {
    http: Arc<GatewayHttpClient>,
    base_url: String,
}

impl DatabankClient {
    pub fn new(http: Arc<GatewayHttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a character entry by name.
    ///
    /// The name is URL-escaped; the API returns an array and the first
    /// element wins. No match, a failing request, or a malformed body all
    /// yield `None`.
    pub async fn character_image(&self, name: &str) -> Option<DatabankCharacter> {
        let url = format!(
            "{}/characters/name/{}",
            self.base_url,
            urlencoding::encode(name)
        );

        let request = match self.http.client().get(&url).build() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Failed to build Databank request: {}", e);
                return None;
            }
        };

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error fetching Databank data: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Databank request failed");
            return None;
        }

        match response.json::<Vec<DatabankCharacter>>().await {
            Ok(mut results) if !results.is_empty() => Some(results.remove(0)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to decode Databank response: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LoginRedirect, RefreshCoordinator};
    use crate::credentials::CredentialStore;
    use reqwest::Client;
    use std::time::Duration;

    fn databank_for(base_url: &str) -> DatabankClient {
        let store = CredentialStore::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            Client::new(),
            store.clone(),
            "http://session.invalid",
            Duration::from_secs(5),
            LoginRedirect::new(),
        ));
        let http = Arc::new(GatewayHttpClient::new(
            Client::new(),
            store,
            coordinator,
            "http://session.invalid",
        ));
        DatabankClient::new(http, base_url)
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/characters/name/Leia%20Organa")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"_id": "a1", "name": "Leia Organa", "description": "Princess", "image": "https://example.com/leia.png"},
                    {"_id": "a2", "name": "Leia (clone)", "description": "", "image": "https://example.com/other.png"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let databank = databank_for(&server.url());
        let result = databank.character_image("Leia Organa").await.unwrap();

        assert_eq!(result.id, "a1");
        assert_eq!(result.image, "https://example.com/leia.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_array_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/characters/name/Nobody")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let databank = databank_for(&server.url());
        assert!(databank.character_image("Nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/characters/name/Luke")
            .with_status(500)
            .create_async()
            .await;

        let databank = databank_for(&server.url());
        assert!(databank.character_image("Luke").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_degrades_to_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/characters/name/Luke")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let databank = databank_for(&server.url());
        assert!(databank.character_image("Luke").await.is_none());
    }
}
