use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CredentialVerifier, LoginRedirect, MockVerifier, RefreshCoordinator};
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::cookies::{
    expired_cookie, get_cookie, session_cookie, ACCESS_COOKIE, ACCESS_MAX_AGE, REFRESH_COOKIE,
    REFRESH_MAX_AGE,
};
use crate::credentials::CredentialStore;
use crate::databank::DatabankClient;
use crate::error::ApiError;
use crate::http_client::GatewayHttpClient;
use crate::middleware;
use crate::models::auth::{LoginRequest, LoginResponse, MessageResponse, RefreshResponse};
use crate::models::catalog::{Character, DatabankCharacter, Page, Planet, Species, Starship};

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub catalog: Arc<CatalogClient>,
    pub databank: Arc<DatabankClient>,
}

impl AppState {
    /// Wire up the full state graph from a configuration: credential
    /// store, refresh coordinator, shared HTTP client, upstream clients,
    /// and the credential verifier.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let store = CredentialStore::new();
        let redirect = LoginRedirect::new();
        let session_origin = format!("http://{}:{}", config.server_host, config.server_port);

        let coordinator = Arc::new(RefreshCoordinator::new(
            Client::new(),
            store.clone(),
            &session_origin,
            Duration::from_secs(config.refresh_timeout),
            redirect,
        ));
        let http = Arc::new(GatewayHttpClient::new(
            Client::new(),
            store,
            coordinator,
            &session_origin,
        ));

        let catalog = Arc::new(CatalogClient::new(Arc::clone(&http), &config.catalog_api_url));
        let databank = Arc::new(DatabankClient::new(http, &config.databank_api_url));
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(MockVerifier::from_config(&config));

        Self {
            config,
            verifier,
            catalog,
            databank,
        }
    }
}

/// Query parameters accepted by the list endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
}

/// Status routes (no authentication required)
pub fn status_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/login", get(login_page_handler))
}

/// Authentication routes (public by definition)
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/logout", post(logout_handler))
        .with_state(state)
}

/// Catalog routes, gated by the route-protection middleware
pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/characters", get(characters_handler))
        .route("/api/characters/:name/image", get(character_image_handler))
        .route("/api/planets", get(planets_handler))
        .route("/api/species", get(species_handler))
        .route("/api/starships", get(starships_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::guard_middleware,
        ))
        .with_state(state)
}

/// Build the application with all routes and middleware
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(status_routes())
        .merge(auth_routes(state.clone()))
        .merge(catalog_routes(state))
        .layer(middleware::cors_layer())
}

/// GET / - Simple health check
///
/// Returns basic status and version information.
/// This endpoint does not require authentication (for load balancers).
async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Holocron Gateway is running",
        "version": VERSION
    }))
}

/// GET /health - Detailed health check
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": VERSION
    }))
}

/// GET /login - Login entry point
///
/// Target of the route-protection redirect. A UI would live here; the
/// gateway answers with a hint instead.
async fn login_page_handler() -> Json<Value> {
    Json(json!({
        "message": "Authentication required",
        "login": "/api/auth/login"
    }))
}

/// POST /api/auth/login - Authenticate with the mock credential pair
///
/// On success the access token is returned in the body for the client's
/// session state, and both credentials are set as cookies.
async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state.verifier.verify(&body.username, &body.password) {
        tracing::warn!("Login rejected for user '{}'", body.username);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse {
                message: "Invalid credentials".to_string(),
            }),
        )
            .into_response());
    }

    let access_token = state
        .config
        .mock_access_token
        .clone()
        .ok_or_else(|| ApiError::Config("MOCK_ACCESS_TOKEN not configured".to_string()))?;
    let refresh_token = state
        .config
        .mock_refresh_token
        .clone()
        .ok_or_else(|| ApiError::Config("MOCK_REFRESH_TOKEN not configured".to_string()))?;

    tracing::info!("Login successful for user '{}'", body.username);

    let production = state.config.production_cookies;
    let mut response = Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: access_token.clone(),
    })
    .into_response();

    append_set_cookie(
        &mut response,
        &session_cookie(ACCESS_COOKIE, &access_token, ACCESS_MAX_AGE, production),
    )?;
    append_set_cookie(
        &mut response,
        &session_cookie(REFRESH_COOKIE, &refresh_token, REFRESH_MAX_AGE, production),
    )?;

    Ok(response)
}

/// POST /api/auth/refresh - Mint a new access credential
///
/// Validates the `refreshToken` cookie against the configured value and
/// resets the access cookie on success.
async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let expected = state
        .config
        .mock_refresh_token
        .clone()
        .ok_or_else(|| ApiError::Config("MOCK_REFRESH_TOKEN not configured".to_string()))?;

    let provided = get_cookie(&headers, REFRESH_COOKIE);
    if provided.as_deref() != Some(expected.as_str()) {
        tracing::warn!("Refresh rejected: missing or mismatched refresh token");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse {
                message: "Invalid refresh token".to_string(),
            }),
        )
            .into_response());
    }

    let new_access_token = state
        .config
        .mock_new_access_token
        .clone()
        .ok_or_else(|| ApiError::Config("MOCK_NEW_ACCESS_TOKEN not configured".to_string()))?;

    tracing::debug!("Access credential refreshed");

    let mut response = Json(RefreshResponse {
        message: "Token refreshed".to_string(),
        new_access_token: new_access_token.clone(),
    })
    .into_response();

    append_set_cookie(
        &mut response,
        &session_cookie(
            ACCESS_COOKIE,
            &new_access_token,
            ACCESS_MAX_AGE,
            state.config.production_cookies,
        ),
    )?;

    Ok(response)
}

/// POST /api/auth/logout - End the session
///
/// Deletes both credential cookies unconditionally.
async fn logout_handler(State(_state): State<AppState>) -> Result<Response, ApiError> {
    let mut response = Json(MessageResponse {
        message: "Logout successful".to_string(),
    })
    .into_response();

    append_set_cookie(&mut response, &expired_cookie(ACCESS_COOKIE))?;
    append_set_cookie(&mut response, &expired_cookie(REFRESH_COOKIE))?;

    Ok(response)
}

/// GET /api/characters - Paginated, searchable character list
async fn characters_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Character>>, ApiError> {
    let (page, search) = list_params(query);
    let result = state.catalog.characters(page, &search).await?;
    Ok(Json(result))
}

/// GET /api/characters/{name}/image - Character portrait lookup
///
/// Returns `null` when the image API has no match, so consumers can fall
/// back to a placeholder.
async fn character_image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Option<DatabankCharacter>> {
    Json(state.databank.character_image(&name).await)
}

/// GET /api/planets - Paginated, searchable planet list
async fn planets_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Planet>>, ApiError> {
    let (page, search) = list_params(query);
    let result = state.catalog.planets(page, &search).await?;
    Ok(Json(result))
}

/// GET /api/species - Paginated, searchable species list
async fn species_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Species>>, ApiError> {
    let (page, search) = list_params(query);
    let result = state.catalog.species(page, &search).await?;
    Ok(Json(result))
}

/// GET /api/starships - Paginated, searchable starship list
async fn starships_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Starship>>, ApiError> {
    let (page, search) = list_params(query);
    let result = state.catalog.starships(page, &search).await?;
    Ok(Json(result))
}

fn list_params(query: ListQuery) -> (u32, String) {
    (query.page.unwrap_or(1).max(1), query.search.unwrap_or_default())
}

fn append_set_cookie(response: &mut Response, cookie: &str) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Internal(anyhow!("invalid cookie header: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
