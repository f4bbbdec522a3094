//! Food Vision Server
//!
//! HTTP API serving food classification. Loads the classifier, the class
//! index and the nutrition table once at startup, then answers
//! `POST /predict` uploads with the predicted food and its nutrition facts.

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use food_vision::config::{DEFAULT_CLASS_INDEX_PATH, DEFAULT_MODEL_PATH, DEFAULT_NUTRITION_PATH};
use food_vision::utils::logging::{init_logging, LogConfig};
use food_vision::{AssetPaths, ServiceContext};

use crate::state::{AppState, ServerConfig};

/// Food Vision Server
#[derive(Parser, Debug)]
#[command(name = "food-vision-server")]
#[command(version)]
#[command(about = "HTTP API for food classification with nutrition facts")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Path to the classifier checkpoint (.pth or .mpk)
    #[arg(long, env = "FOOD_VISION_MODEL", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Path to the class index JSON
    #[arg(long, env = "FOOD_VISION_CLASS_INDEX", default_value = DEFAULT_CLASS_INDEX_PATH)]
    class_index: PathBuf,

    /// Path to the nutrition CSV
    #[arg(long, env = "FOOD_VISION_NUTRITION", default_value = DEFAULT_NUTRITION_PATH)]
    nutrition: PathBuf,

    /// Verbose logging
    #[arg(long, env = "FOOD_VISION_DEBUG", default_value = "false")]
    debug: bool,

    /// Maximum upload size in megabytes
    #[arg(long, env = "FOOD_VISION_BODY_LIMIT_MB", default_value = "16")]
    body_limit_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::for_debug(cli.debug)).map_err(anyhow::Error::msg)?;

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        body_limit_bytes: cli.body_limit_mb * 1024 * 1024,
        assets: AssetPaths {
            model: cli.model,
            class_index: cli.class_index,
            nutrition: cli.nutrition,
        },
    };

    info!("Food Vision Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Model:       {:?}", config.assets.model);
    info!("  Class index: {:?}", config.assets.class_index);
    info!("  Nutrition:   {:?}", config.assets.nutrition);
    info!("  Body limit:  {} MB", cli.body_limit_mb);
    info!("  Debug:       {}", config.debug);

    // Nothing is served until every asset has loaded
    let context = ServiceContext::load(&config.assets).context("Failed to load service assets")?;
    info!(
        "Serving {} classes on {}",
        context.class_index().len(),
        context.backend_name()
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let state = Arc::new(AppState::new(config, context));
    let app = routes::router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
