//! # Food Vision
//!
//! Food image classification with nutrition lookup, built on the Burn framework.
//!
//! An uploaded photo is normalized exactly the way the classifier was
//! trained, classified by a DenseNet-201 with a replaced head, and the
//! predicted label is enriched with per-100g nutrition facts.
//!
//! ## Modules
//!
//! - `data`: class index map and nutrition table
//! - `model`: DenseNet architecture built with Burn
//! - `inference`: preprocessing and the frozen classifier
//! - `service`: startup context and request handling
//! - `backend`: CPU / CUDA backend selection
//! - `utils`: logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use food_vision::{AssetPaths, ServiceContext};
//!
//! let context = ServiceContext::load(&AssetPaths::default())?;
//! let result = context.predict_bytes(&std::fs::read("pizza.jpg")?)?;
//! println!("{} ({:.2}%)", result.display_name, result.confidence_percent());
//! ```

pub mod backend;
pub mod config;
pub mod data;
pub mod inference;
pub mod model;
pub mod service;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::AssetPaths;
pub use data::{display_name, ClassIndex, NutritionRecord, NutritionTable, NutritionValue};
pub use inference::{Classifier, Classify, Prediction, Preprocessor};
pub use model::{DenseNetConfig, FoodClassifier};
pub use service::{FoodPrediction, JsonReply, PredictionResult, ServiceContext, UploadedFiles};
pub use utils::error::{FoodVisionError, Result};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
