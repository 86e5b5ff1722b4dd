use anyhow::Result;
use tracing::info;

use matcha_watcher::config::AppConfig;
use matcha_watcher::{poller, reporter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("matcha_watcher=info".parse()?),
        )
        .init();

    info!("Starting availability check...");

    let config = AppConfig::from_env()?;
    let newly_available = poller::run_once(&config).await?;
    reporter::report(&newly_available);

    info!("Done.");

    Ok(())
}
