//! `parley` HTTP server binary.

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use parley::config::{LayeredConfigOptions, ParleyConfig};
use parley::core::{ChatOptions, OpenAiCompatibleProvider, Orchestrator};
use parley::memory::{ConversationStore, StoreLimits};
use parley::server::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Command-line options for the chat server.
#[derive(Parser)]
#[command(name = "parley", version, about = "Session-memory chat API")]
struct Cli {
    /// Extra parley.json5 applied on top of the discovered layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, e.g. 127.0.0.1:8000
    #[arg(long)]
    bind: Option<String>,
    /// Model name sent to the provider
    #[arg(long)]
    model: Option<String>,
}

fn load_config(cli: &Cli) -> anyhow::Result<ParleyConfig> {
    let cwd = std::env::current_dir().context("cwd")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered = ParleyConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    let mut config = layered.config;
    if let Some(bind) = cli.bind.as_ref() {
        config.server.bind = bind.clone();
    }
    if let Some(model) = cli.model.as_ref() {
        config.provider.model = model.clone();
    }
    config.validate().context("invalid command-line override")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c (error={err})");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parley::init_logging();

    let cli = Cli::parse();
    info!(
        "starting parley (config_set={}, bind_set={}, model_set={})",
        cli.config.is_some(),
        cli.bind.is_some(),
        cli.model.is_some()
    );
    let config = load_config(&cli)?;

    let limits = StoreLimits::new(config.memory.max_entries, config.memory.ttl_seconds)
        .context("invalid memory limits")?;
    let store = ConversationStore::new(limits);
    let provider = OpenAiCompatibleProvider::from_env(&config.provider)
        .context("failed to build LLM provider")?;
    let orchestrator = Orchestrator::with_options(
        store.clone(),
        Arc::new(provider),
        ChatOptions::from(&config.chat),
    );

    let sweeper = config
        .memory
        .sweep_interval_seconds
        .map(|seconds| parley::spawn_sweeper(store, Duration::from_secs(seconds)));

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    parley::server::serve(listener, AppState::new(orchestrator), shutdown_signal())
        .await
        .context("http server failed")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("parley stopped");
    Ok(())
}
