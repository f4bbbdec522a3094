//! Inference module: preprocessing and the frozen classifier
//!
//! This module provides:
//! - Image decoding and the ImageNet-normalized preprocessing transform
//! - Checkpoint loading from PyTorch state dicts or Burn records
//! - The `Classify` trait and its Burn-backed implementation
//! - Device selection at load time (CUDA when available, CPU otherwise)

pub mod checkpoint;
pub mod classifier;
pub mod preprocess;

// Re-export main types for convenience
pub use checkpoint::{resolve_checkpoint, CheckpointFormat};
pub use classifier::{load_classifier, Classifier, Classify, Prediction};
pub use preprocess::{decode_image, ImageTensor, Preprocessor, IMAGENET_MEAN, IMAGENET_STD, INPUT_SIZE};
