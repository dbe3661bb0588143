use anyhow::Result;

mod auth;
mod catalog;
mod config;
mod cookies;
mod credentials;
mod databank;
mod error;
mod http_client;
mod middleware;
mod models;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("🚀 Holocron Gateway starting...");
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );
    tracing::info!(
        "Catalog API: {} | Databank API: {}",
        config.catalog_api_url,
        config.databank_api_url
    );
    if config.enforce_token_expiry {
        tracing::info!("Token expiry enforcement enabled");
    }

    let addr = format!("{}:{}", config.server_host, config.server_port);

    // Wire up the application state and routes
    let app_state = routes::AppState::new(config.clone());
    let app = routes::build_app(app_state);

    // Bind to configured host and port
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Print startup banner
    print_startup_banner(&config);

    // Start server with graceful shutdown
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server shutdown complete");

    Ok(())
}

/// Print startup information banner
fn print_startup_banner(config: &config::Config) {
    let banner = r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║             🌌 Holocron Gateway - Rust Edition            ║
║                                                           ║
║  Star Wars catalog gateway with mock cookie sessions      ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner);
    println!("  Version:     {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Server:      http://{}:{}",
        config.server_host, config.server_port
    );
    println!("  Catalog:     {}", config.catalog_api_url);
    println!("  Databank:    {}", config.databank_api_url);
    println!("  Log Level:   {}", config.log_level);
    println!(
        "  Token Expiry: {}",
        if config.enforce_token_expiry {
            "enforced"
        } else {
            "ignored"
        }
    );
    println!();
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
