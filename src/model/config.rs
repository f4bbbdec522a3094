//! Model Configuration Module
//!
//! Topology hyperparameters for the DenseNet backbone and the replaced
//! classification head.

use serde::{Deserialize, Serialize};

use super::{HEAD_DROPOUT, HEAD_HIDDEN_UNITS};

/// Configuration for the DenseNet classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetConfig {
    /// Channels added by every dense layer
    pub growth_rate: usize,

    /// Number of dense layers in each block
    pub block_config: Vec<usize>,

    /// Channels produced by the stem convolution
    pub num_init_features: usize,

    /// Bottleneck width multiplier (bottleneck = bn_size * growth_rate)
    pub bn_size: usize,

    /// Number of input channels (3 for RGB)
    pub in_channels: usize,

    /// Hidden width of the classification head
    pub hidden_units: usize,

    /// Dropout rate inside the classification head
    pub dropout_rate: f64,
}

impl Default for DenseNetConfig {
    fn default() -> Self {
        Self::densenet201()
    }
}

impl DenseNetConfig {
    /// DenseNet-201 backbone with the food classification head
    pub fn densenet201() -> Self {
        Self {
            growth_rate: 32,
            block_config: vec![6, 12, 48, 32],
            num_init_features: 64,
            bn_size: 4,
            in_channels: 3,
            hidden_units: HEAD_HIDDEN_UNITS,
            dropout_rate: HEAD_DROPOUT,
        }
    }

    /// Width of the feature vector fed into the head.
    ///
    /// Each block adds `layers * growth_rate` channels and every transition
    /// between blocks halves the channel count.
    pub fn num_features(&self) -> usize {
        let last = self.block_config.len().saturating_sub(1);
        self.block_config
            .iter()
            .enumerate()
            .fold(self.num_init_features, |features, (i, &layers)| {
                let grown = features + layers * self.growth_rate;
                if i < last {
                    grown / 2
                } else {
                    grown
                }
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.block_config.is_empty() || self.block_config.contains(&0) {
            return Err("block_config must list at least one non-empty block".to_string());
        }

        if self.growth_rate == 0 || self.bn_size == 0 || self.num_init_features == 0 {
            return Err("growth_rate, bn_size and num_init_features must be positive".to_string());
        }

        if self.in_channels == 0 || self.hidden_units == 0 {
            return Err("in_channels and hidden_units must be positive".to_string());
        }

        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err("dropout_rate must be in range [0.0, 1.0)".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
impl DenseNetConfig {
    /// Small topology that keeps CPU tests fast
    pub(crate) fn tiny() -> Self {
        Self {
            growth_rate: 4,
            block_config: vec![2, 2],
            num_init_features: 8,
            bn_size: 2,
            in_channels: 3,
            hidden_units: 16,
            dropout_rate: HEAD_DROPOUT,
        }
    }
}
