//! Offline classification tool
//!
//! Classifies one image with the same assets the server loads and prints
//! the `/predict` response body.
//!
//! Usage:
//!   cargo run --release --bin classify -- --image pizza.jpg

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use food_vision::config::{DEFAULT_CLASS_INDEX_PATH, DEFAULT_MODEL_PATH, DEFAULT_NUTRITION_PATH};
use food_vision::utils::logging::{init_logging, LogConfig};
use food_vision::{AssetPaths, ServiceContext};

/// Classify a food photo and look up its nutrition facts
#[derive(Parser, Debug)]
#[command(name = "classify")]
#[command(version)]
#[command(about = "Classify a food image offline")]
struct Args {
    /// Path to the input image
    #[arg(short, long)]
    image: PathBuf,

    /// Path to the classifier checkpoint (.pth or .mpk)
    #[arg(short, long, env = "FOOD_VISION_MODEL", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Path to the class index JSON
    #[arg(long, env = "FOOD_VISION_CLASS_INDEX", default_value = DEFAULT_CLASS_INDEX_PATH)]
    class_index: PathBuf,

    /// Path to the nutrition CSV
    #[arg(long, env = "FOOD_VISION_NUTRITION", default_value = DEFAULT_NUTRITION_PATH)]
    nutrition: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LogConfig::for_debug(args.verbose)).map_err(anyhow::Error::msg)?;

    let paths = AssetPaths {
        model: args.model,
        class_index: args.class_index,
        nutrition: args.nutrition,
    };
    let context = ServiceContext::load(&paths)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image {:?}", args.image))?;
    let result = context.predict_bytes(&bytes)?;
    info!(
        "{:?}: {} ({:.2}%)",
        args.image,
        result.display_name,
        result.confidence_percent()
    );

    println!("{}", serde_json::to_string_pretty(&result.into_response())?);
    Ok(())
}
