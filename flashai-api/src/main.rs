//! FlashAI API server - main entry point
//!
//! Resolves configuration (fail fast on missing provider credentials), opens
//! the flashcard store, and serves the HTTP API until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use flashai_api::llm::{ClientSettings, ModelClient, OpenAiClient};
use flashai_api::store::FlashcardStore;
use flashai_api::{build_banner, build_router, cors_layer, AppState};
use flashai_common::config::{load_toml_config, AppConfig, ConfigOverrides};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for flashai-api
#[derive(Parser, Debug)]
#[command(name = "flashai-api")]
#[command(about = "FlashAI language-learning backend")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "FLASHAI_CONFIG")]
    config: Option<PathBuf>,

    /// Model provider API key
    #[arg(long)]
    api_key: Option<String>,

    /// Model provider base URL (e.g. https://api.openai.com)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Chat-completion model name
    #[arg(long)]
    model: Option<String>,

    /// Flashcard data file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            model: self.model.clone(),
            data_file: self.data_file.clone(),
            bind_address: self.bind.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The log level may come from the TOML file, so read it before tracing is up
    let toml_config = load_toml_config(args.config.as_deref());
    let log_level = args
        .log_level
        .clone()
        .or_else(|| toml_config.as_ref().ok().map(|t| t.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {}", build_banner());

    let toml_config = toml_config.context("Failed to load config file")?;
    let config = match AppConfig::resolve(&args.overrides(), &toml_config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Refusing to start without a valid configuration");
        }
    };
    info!(config = ?config, "Configuration resolved");

    let store = Arc::new(
        FlashcardStore::open(&config.data_file)
            .await
            .with_context(|| format!("Failed to open flashcard store {}", config.data_file.display()))?,
    );
    info!("Flashcard store ready: {} record(s)", store.len().await);

    let model: Arc<dyn ModelClient> = Arc::new(
        OpenAiClient::new(ClientSettings::from(&config)).context("Failed to create model client")?,
    );
    info!(model = %config.model, base_url = %config.api_base_url, "Model client initialized");

    let app = build_router(AppState::new(model, store.clone())).layer(cors_layer(&config.cors_origins));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await.context("Failed to flush flashcard store")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
