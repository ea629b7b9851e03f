//! AutoJoin - opens video meetings from your calendar shortly before they
//! start.
//!
//! Runs as a daemon: refreshes today's calendar on a schedule and answers
//! newline-delimited JSON messages on stdin. Logs go to stderr so stdout
//! carries only protocol responses.

use std::sync::Arc;

use anyhow::Context;
use autojoin_lib::{serve, AppContext};
use tokio::io::BufReader;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,autojoin=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("AUTOJOIN_LOG_JSON").is_ok_and(|value| value == "1");

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads RUST_LOG
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let config = autojoin_infra::config::load().context("failed to load configuration")?;
    let ctx = Arc::new(AppContext::new(config).await.context("failed to build application")?);
    ctx.start().await.context("failed to start application")?;

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        served = serve(&ctx, stdin, tokio::io::stdout()) => {
            match served {
                Ok(answered) => info!(answered, "Input closed; running until interrupted"),
                Err(err) => warn!(error = %err, "Message input failed; running until interrupted"),
            }
            tokio::signal::ctrl_c().await.context("failed to listen for interrupt")?;
        }
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("failed to listen for interrupt")?;
        }
    }

    info!("Interrupt received, shutting down");
    ctx.shutdown().await.context("failed to shut down cleanly")?;
    Ok(())
}
