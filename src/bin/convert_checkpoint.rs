//! Checkpoint Conversion Tool
//!
//! Converts the trained PyTorch state dict into a Burn `CompactRecorder`
//! record, which loads faster at server startup.
//!
//! Usage:
//!   cargo run --release --bin convert_checkpoint -- \
//!     --input models/foodmodel_torch.pth --output models/foodmodel.mpk

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use burn::{module::Module, record::CompactRecorder};
use clap::Parser;
use tracing::info;

use food_vision::backend::CpuBackend;
use food_vision::config::{DEFAULT_CLASS_INDEX_PATH, DEFAULT_MODEL_PATH};
use food_vision::inference::checkpoint::load_model;
use food_vision::inference::resolve_checkpoint;
use food_vision::utils::logging::{init_logging, LogConfig};
use food_vision::{ClassIndex, DenseNetConfig};

/// Convert a PyTorch food classifier checkpoint to a Burn record
#[derive(Parser, Debug)]
#[command(name = "convert_checkpoint")]
#[command(about = "Convert the PyTorch classifier checkpoint to a Burn .mpk record")]
struct Args {
    /// PyTorch state dict (.pth)
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    input: PathBuf,

    /// Output record path (.mpk)
    #[arg(short, long, default_value = "models/foodmodel.mpk")]
    output: PathBuf,

    /// Class index JSON, sizes the classification head
    #[arg(long, default_value = DEFAULT_CLASS_INDEX_PATH)]
    class_index: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LogConfig::for_debug(args.verbose)).map_err(anyhow::Error::msg)?;

    let class_index = ClassIndex::load(&args.class_index)?;
    let (input, format) = resolve_checkpoint(&args.input)?;
    let device = Default::default();

    let model = load_model::<CpuBackend>(
        &input,
        format,
        &DenseNetConfig::densenet201(),
        class_index.len(),
        &device,
    )?;
    info!("Loaded {:?} with {} classes", input, class_index.len());

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    model
        .save_file(args.output.clone(), &CompactRecorder::new())
        .map_err(|e| anyhow!("Failed to write {:?}: {:?}", args.output, e))?;

    info!("Wrote {:?}", args.output.with_extension("mpk"));
    Ok(())
}
