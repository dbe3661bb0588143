// Typed fetchers for the upstream catalog API

use anyhow::anyhow;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::ApiError;
use crate::http_client::GatewayHttpClient;
use crate::models::catalog::{Character, Page, Planet, Species, Starship};

/// Client for the paginated catalog collections and homeworld lookups.
///
/// All requests go through the shared gateway client, so they never carry
/// session credentials to the third-party host.
pub struct CatalogClient {
    http: Arc<GatewayHttpClient>,
    base_url: String,
}

impl CatalogClient {
    pub fn new(http: Arc<GatewayHttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a page of characters, optionally filtered by a search term
    pub async fn characters(&self, page: u32, search: &str) -> Result<Page<Character>, ApiError> {
        self.list("people", page, search).await
    }

    /// Fetch a page of planets
    pub async fn planets(&self, page: u32, search: &str) -> Result<Page<Planet>, ApiError> {
        self.list("planets", page, search).await
    }

    /// Fetch a page of species
    pub async fn species(&self, page: u32, search: &str) -> Result<Page<Species>, ApiError> {
        self.list("species", page, search).await
    }

    /// Fetch a page of starships
    pub async fn starships(&self, page: u32, search: &str) -> Result<Page<Starship>, ApiError> {
        self.list("starships", page, search).await
    }

    /// Fetch a single planet by its absolute resource URL, as referenced
    /// from a character's homeworld field
    pub async fn homeworld(&self, url: &str) -> Result<Planet, ApiError> {
        let request = self
            .http
            .client()
            .get(url)
            .build()
            .map_err(|e| ApiError::Internal(anyhow!("failed to build request: {}", e)))?;

        let response = self.http.execute(request).await?;
        Self::parse(response).await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        page: u32,
        search: &str,
    ) -> Result<Page<T>, ApiError> {
        let url = format!("{}/{}/", self.base_url, collection);
        tracing::debug!(collection = collection, page = page, search = search, "Catalog fetch");

        let request = self
            .http
            .client()
            .get(&url)
            .query(&[("page", page.to_string()), ("search", search.to_string())])
            .build()
            .map_err(|e| ApiError::Internal(anyhow!("failed to build request: {}", e)))?;

        let response = self.http.execute(request).await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Catalog request failed");
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Upstream {
            status: status.as_u16(),
            message: format!("failed to decode catalog response: {}", e),
        })
    }
}
