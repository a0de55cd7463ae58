use anyhow::{Context, Result};
use medassist::{ui::TerminalUI, Config, InferenceClient};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = ".medassist.log";

/// Logs go to a file so they do not interleave with the REPL.
fn init_tracing() -> Result<PathBuf> {
    let log_path = dirs::home_dir()
        .map(|home| home.join(LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("medassist=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let log_path = init_tracing()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_path.display(),
        "medassist starting"
    );

    let config = Config::from_env()
        .context("set API_KEY and DEPLOYMENT_URL in the environment or a .env file")?;
    tracing::info!(
        deployment = %config.deployment_url,
        timeout_secs = config.request_timeout.as_secs(),
        max_new_tokens = config.max_new_tokens.get(),
        "configuration loaded"
    );

    let client = InferenceClient::new(config)?;
    let mut ui = TerminalUI::new(client)?;
    ui.run().await?;

    tracing::info!("medassist exiting");
    Ok(())
}
