use anyhow::Context;

use news_relay::app::build_router;
use news_relay::config::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development convenience; real deployments set the environment.
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().context("Invalid configuration")?;

    let providers = config.provider_names();
    eprintln!("📰 News Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://{}/api/telegram", config.bind_addr);
    eprintln!("   WordPress: {}", config.wordpress.site_url);
    if providers.is_empty() {
        eprintln!("   Providers: none (fallback only)");
    } else {
        eprintln!("   Providers: {}", providers.join(" → "));
    }
    eprintln!("   Allowed chat: {}\n", config.telegram.allowed_chat_id);

    let app = build_router(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Webhook server started");

    axum::serve(listener, app).await?;
    Ok(())
}
