//! Model module for the DenseNet food classifier using the Burn framework
//!
//! This module provides:
//! - The DenseNet backbone with its replaced classification head
//! - Topology configuration (`DenseNetConfig`)
//!
//! Weights are loaded by [`crate::inference::checkpoint`]; nothing here
//! touches the filesystem.

pub mod config;
pub mod densenet;

// Re-export main types for convenience
pub use config::DenseNetConfig;
pub use densenet::{ClassifierHead, FoodClassifier};

/// Hidden width of the replaced classification head
pub const HEAD_HIDDEN_UNITS: usize = 1024;

/// Dropout rate inside the classification head (active only when training)
pub const HEAD_DROPOUT: f64 = 0.4;
