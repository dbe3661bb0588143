use anyhow::Result;
use clap::Parser;

/// Holocron Gateway - mock authentication gateway for the Star Wars catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8000")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Bounded wait for a credential refresh call, in seconds
    #[arg(long, env = "REFRESH_TIMEOUT", default_value = "10")]
    pub refresh_timeout: u64,

    /// Redirect on expired access tokens, not just missing ones
    #[arg(long, env = "ENFORCE_TOKEN_EXPIRY", default_value = "false")]
    pub enforce_token_expiry: bool,

    /// Mark session cookies HttpOnly and Secure (disable for local development)
    #[arg(long, env = "PRODUCTION_COOKIES", default_value = "false")]
    pub production_cookies: bool,

    /// Base URL of the upstream catalog API
    #[arg(long, env = "CATALOG_API_URL", default_value = "https://swapi.dev/api")]
    pub catalog_api_url: String,

    /// Base URL of the character-image lookup API
    #[arg(
        long,
        env = "DATABANK_API_URL",
        default_value = "https://starwars-databank-server.vercel.app/api/v1"
    )]
    pub databank_api_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Mock token material. Deliberately optional: a missing value is a
    // per-request configuration error, not a startup failure.
    pub mock_access_token: Option<String>,
    pub mock_refresh_token: Option<String>,
    pub mock_new_access_token: Option<String>,

    // Fixed credential pair accepted by the login endpoint
    pub mock_username: String,
    pub mock_password: String,

    // Upstream APIs
    pub catalog_api_url: String,
    pub databank_api_url: String,

    // Session policy
    pub refresh_timeout: u64,
    pub enforce_token_expiry: bool,
    pub production_cookies: bool,

    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Parse CLI arguments
        let args = CliArgs::parse();

        let config = Config {
            server_host: args.host,
            server_port: args.port,

            mock_access_token: std::env::var("MOCK_ACCESS_TOKEN").ok(),
            mock_refresh_token: std::env::var("MOCK_REFRESH_TOKEN").ok(),
            mock_new_access_token: std::env::var("MOCK_NEW_ACCESS_TOKEN").ok(),

            mock_username: std::env::var("MOCK_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            mock_password: std::env::var("MOCK_PASSWORD")
                .unwrap_or_else(|_| "password123".to_string()),

            catalog_api_url: trim_trailing_slash(&args.catalog_api_url),
            databank_api_url: trim_trailing_slash(&args.databank_api_url),

            refresh_timeout: args.refresh_timeout,
            enforce_token_expiry: args.enforce_token_expiry,
            production_cookies: args.production_cookies,

            log_level: args.log_level,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.refresh_timeout == 0 {
            anyhow::bail!("REFRESH_TIMEOUT must be greater than zero");
        }

        if self.mock_access_token.is_none() || self.mock_refresh_token.is_none() {
            // Startup proceeds, but every login will fail with a 500 until
            // the token material is provided.
            tracing::warn!(
                "MOCK_ACCESS_TOKEN / MOCK_REFRESH_TOKEN not set; login requests will fail"
            );
        }

        Ok(())
    }

    /// Create a configuration for tests, pointed at a mock upstream
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_testing(catalog_url: &str, databank_url: &str) -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            mock_access_token: Some("mock-access-token".to_string()),
            mock_refresh_token: Some("mock-refresh-token".to_string()),
            mock_new_access_token: Some("mock-new-access-token".to_string()),
            mock_username: "admin".to_string(),
            mock_password: "password123".to_string(),
            catalog_api_url: trim_trailing_slash(catalog_url),
            databank_api_url: trim_trailing_slash(databank_url),
            refresh_timeout: 10,
            enforce_token_expiry: false,
            production_cookies: false,
            log_level: "info".to_string(),
        }
    }
}

/// Normalize a base URL so joins never produce double slashes
fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
