use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showtime_core::{env_lookup, load_config, load_dotenv, session_factory, validate_config};

mod startup;

/// Config path used when `SHOWTIME_CONFIG` is not set.
const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() {
    let code = startup::exit_code(run().await);
    std::process::exit(code);
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = load_dotenv()? {
        info!("Loaded environment from {:?}", path);
    }

    // Determine config path
    let config_path = std::env::var("SHOWTIME_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sessions = session_factory(&config.browser);
    startup::execute(&config, env_lookup, sessions).await?;

    Ok(())
}
