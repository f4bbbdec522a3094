//! DenseNet Food Classifier
//!
//! DenseNet backbone built with the Burn framework, with its classification
//! layer replaced by a small feed-forward head sized to the food classes.

use burn::{
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{
            AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, AvgPool2d, AvgPool2dConfig, MaxPool2d,
            MaxPool2dConfig,
        },
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig,
        PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use super::config::DenseNetConfig;

/// Stem: 7x7/2 conv, BatchNorm, ReLU, 3x3/2 max-pool
#[derive(Module, Debug)]
pub struct Stem<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
    pub relu: Relu,
    pub pool: MaxPool2d,
}

impl<B: Backend> Stem<B> {
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [7, 7])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(3, 3))
            .with_bias(false)
            .init(device);

        let pool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        Self {
            conv,
            norm: BatchNormConfig::new(out_channels).init(device),
            relu: Relu::new(),
            pool,
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        let x = self.relu.forward(x);
        self.pool.forward(x)
    }
}

/// Bottleneck dense layer: BN-ReLU-Conv1x1, BN-ReLU-Conv3x3.
///
/// The output is the input with `growth_rate` new channels appended.
#[derive(Module, Debug)]
pub struct DenseLayer<B: Backend> {
    pub norm1: BatchNorm<B, 2>,
    pub conv1: Conv2d<B>,
    pub norm2: BatchNorm<B, 2>,
    pub conv2: Conv2d<B>,
    pub relu: Relu,
}

impl<B: Backend> DenseLayer<B> {
    pub fn new(
        in_channels: usize,
        growth_rate: usize,
        bn_size: usize,
        device: &B::Device,
    ) -> Self {
        let bottleneck = bn_size * growth_rate;

        Self {
            norm1: BatchNormConfig::new(in_channels).init(device),
            conv1: Conv2dConfig::new([in_channels, bottleneck], [1, 1])
                .with_bias(false)
                .init(device),
            norm2: BatchNormConfig::new(bottleneck).init(device),
            conv2: Conv2dConfig::new([bottleneck, growth_rate], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_bias(false)
                .init(device),
            relu: Relu::new(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = self.norm1.forward(x.clone());
        let out = self.relu.forward(out);
        let out = self.conv1.forward(out);
        let out = self.norm2.forward(out);
        let out = self.relu.forward(out);
        let out = self.conv2.forward(out);

        Tensor::cat(vec![x, out], 1)
    }
}

/// A stack of dense layers sharing one growing feature map
#[derive(Module, Debug)]
pub struct DenseBlock<B: Backend> {
    pub layers: Vec<DenseLayer<B>>,
}

impl<B: Backend> DenseBlock<B> {
    pub fn new(
        num_layers: usize,
        in_channels: usize,
        growth_rate: usize,
        bn_size: usize,
        device: &B::Device,
    ) -> Self {
        let layers = (0..num_layers)
            .map(|i| DenseLayer::new(in_channels + i * growth_rate, growth_rate, bn_size, device))
            .collect();

        Self { layers }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.layers.iter().fold(x, |x, layer| layer.forward(x))
    }
}

/// Transition between blocks: BN-ReLU-Conv1x1 then 2x2/2 average pooling
#[derive(Module, Debug)]
pub struct Transition<B: Backend> {
    pub norm: BatchNorm<B, 2>,
    pub relu: Relu,
    pub conv: Conv2d<B>,
    pub pool: AvgPool2d,
}

impl<B: Backend> Transition<B> {
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            norm: BatchNormConfig::new(in_channels).init(device),
            relu: Relu::new(),
            conv: Conv2dConfig::new([in_channels, out_channels], [1, 1])
                .with_bias(false)
                .init(device),
            pool: AvgPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.norm.forward(x);
        let x = self.relu.forward(x);
        let x = self.conv.forward(x);
        self.pool.forward(x)
    }
}

/// Replacement classification head: Linear -> ReLU -> Dropout -> Linear
#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    pub fc1: Linear<B>,
    pub relu: Relu,
    pub dropout: Dropout,
    pub fc2: Linear<B>,
}

impl<B: Backend> ClassifierHead<B> {
    pub fn new(
        in_features: usize,
        hidden_units: usize,
        num_classes: usize,
        dropout_rate: f64,
        device: &B::Device,
    ) -> Self {
        Self {
            fc1: LinearConfig::new(in_features, hidden_units).init(device),
            relu: Relu::new(),
            dropout: DropoutConfig::new(dropout_rate).init(),
            fc2: LinearConfig::new(hidden_units, num_classes).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.fc1.forward(x);
        let x = self.relu.forward(x);
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Width of the output layer as stored in the weights
    pub fn output_width(&self) -> usize {
        let [_, d_output] = self.fc2.weight.val().dims();
        d_output
    }
}

/// DenseNet food classifier
///
/// Architecture:
/// - Stem convolution and max-pool
/// - Dense blocks separated by channel-halving transitions
/// - Final BatchNorm + ReLU, global average pooling
/// - Two-layer classification head with dropout
#[derive(Module, Debug)]
pub struct FoodClassifier<B: Backend> {
    pub stem: Stem<B>,
    pub blocks: Vec<DenseBlock<B>>,
    pub transitions: Vec<Transition<B>>,
    pub norm_final: BatchNorm<B, 2>,
    pub relu: Relu,
    pub global_pool: AdaptiveAvgPool2d,
    pub head: ClassifierHead<B>,

    num_classes: usize,
}

impl<B: Backend> FoodClassifier<B> {
    /// Create a randomly initialised classifier from configuration
    pub fn new(config: &DenseNetConfig, num_classes: usize, device: &B::Device) -> Self {
        let stem = Stem::new(config.in_channels, config.num_init_features, device);

        let last = config.block_config.len().saturating_sub(1);
        let mut features = config.num_init_features;
        let mut blocks = Vec::with_capacity(config.block_config.len());
        let mut transitions = Vec::with_capacity(last);

        for (i, &num_layers) in config.block_config.iter().enumerate() {
            blocks.push(DenseBlock::new(
                num_layers,
                features,
                config.growth_rate,
                config.bn_size,
                device,
            ));
            features += num_layers * config.growth_rate;

            if i < last {
                transitions.push(Transition::new(features, features / 2, device));
                features /= 2;
            }
        }

        let head = ClassifierHead::new(
            features,
            config.hidden_units,
            num_classes,
            config.dropout_rate,
            device,
        );

        Self {
            stem,
            blocks,
            transitions,
            norm_final: BatchNormConfig::new(features).init(device),
            relu: Relu::new(),
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            head,
            num_classes,
        }
    }

    /// Forward pass through the network
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = self.stem.forward(x);

        for (i, block) in self.blocks.iter().enumerate() {
            x = block.forward(x);
            if let Some(transition) = self.transitions.get(i) {
                x = transition.forward(x);
            }
        }

        let x = self.norm_final.forward(x);
        let x = self.relu.forward(x);

        // [B, C, H, W] -> [B, C, 1, 1] -> [B, C]
        let x = self.global_pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        self.head.forward(x)
    }

    /// Forward pass with softmax over the class dimension
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Number of classes the model was built for
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_dense_layer_appends_growth_channels() {
        let device = Default::default();
        let layer = DenseLayer::<TestBackend>::new(8, 4, 2, &device);

        let input = Tensor::<TestBackend, 4>::zeros([1, 8, 6, 6], &device);
        assert_eq!(layer.forward(input).dims(), [1, 12, 6, 6]);
    }

    #[test]
    fn test_classifier_output_shape() {
        let device = Default::default();
        let config = DenseNetConfig::tiny();
        let model = FoodClassifier::<TestBackend>::new(&config, 5, &device);

        // Create dummy input: [batch=2, channels=3, height=32, width=32]
        let input = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 5]);
        assert_eq!(model.num_classes(), 5);
        assert_eq!(model.head.output_width(), 5);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let device = Default::default();
        let model = FoodClassifier::<TestBackend>::new(&DenseNetConfig::tiny(), 4, &device);

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        let probs: Vec<f32> = model.forward_softmax(input).into_data().to_vec().unwrap();

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_head_input_matches_config() {
        let device = Default::default();
        let config = DenseNetConfig::tiny();
        let model = FoodClassifier::<TestBackend>::new(&config, 3, &device);

        let [d_input, d_output] = model.head.fc1.weight.val().dims();
        assert_eq!(d_input, config.num_features());
        assert_eq!(d_output, config.hidden_units);
    }
}
