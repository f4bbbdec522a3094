//! Frozen classifier
//!
//! Wraps a loaded [`FoodClassifier`] on a concrete backend behind the
//! object-safe [`Classify`] trait, so callers never see which device the
//! forward pass runs on.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use tracing::info;

use crate::backend::{self, CpuBackend, Device};
use crate::model::{DenseNetConfig, FoodClassifier};
use crate::utils::error::{FoodVisionError, Result};
use crate::utils::format_millis;

use super::checkpoint::{self, resolve_checkpoint};
use super::preprocess::ImageTensor;

/// Arg-max of the class distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class index
    pub index: usize,
    /// Softmax probability of the predicted class, in [0, 1]
    pub confidence: f32,
}

impl Prediction {
    /// Pick the most probable class. The first maximum wins on ties.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        let mut best: Option<(usize, f32)> = None;
        for (index, &p) in probabilities.iter().enumerate() {
            if p.is_nan() {
                return Err(FoodVisionError::Inference(
                    "classifier produced NaN probabilities".to_string(),
                ));
            }
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((index, p));
            }
        }

        let (index, confidence) = best.ok_or_else(|| {
            FoodVisionError::Inference("classifier produced no outputs".to_string())
        })?;

        Ok(Self {
            index,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// Inference-only classifier, shareable across request handlers
pub trait Classify: Send + Sync {
    /// Run the forward pass on one preprocessed image
    fn predict(&self, input: &ImageTensor) -> Result<Prediction>;

    /// Width of the output layer
    fn num_classes(&self) -> usize;

    /// Device the classifier runs on
    fn device(&self) -> Device;
}

/// A [`FoodClassifier`] loaded onto a specific backend.
///
/// Burn modules are `Send` but not `Sync`, so the loaded model sits behind
/// a mutex. A request only holds the lock while cloning the module, which
/// shares the weight tensors, and runs its forward pass on the clone.
pub struct Classifier<B: Backend> {
    model: Mutex<FoodClassifier<B>>,
    device: B::Device,
    kind: Device,
    num_classes: usize,
}

impl<B: Backend> Classifier<B> {
    /// Wrap an already built model
    pub fn new(model: FoodClassifier<B>, device: B::Device, kind: Device) -> Self {
        let num_classes = model.num_classes();
        Self {
            model: Mutex::new(model),
            device,
            kind,
            num_classes,
        }
    }

    /// Build the topology and load a checkpoint into it.
    ///
    /// The head is sized to `num_classes`, and the loaded weights must agree.
    pub fn load(
        path: &Path,
        config: &DenseNetConfig,
        num_classes: usize,
        device: B::Device,
        kind: Device,
    ) -> Result<Self> {
        let (path, format) = resolve_checkpoint(path)?;
        let model = checkpoint::load_model::<B>(&path, format, config, num_classes, &device)?;
        Ok(Self::new(model, device, kind))
    }

    fn snapshot(&self) -> Result<FoodClassifier<B>> {
        self.model
            .lock()
            .map(|model| model.clone())
            .map_err(|_| FoodVisionError::Inference("classifier lock poisoned".to_string()))
    }
}

impl<B: Backend> Classify for Classifier<B> {
    fn predict(&self, input: &ImageTensor) -> Result<Prediction> {
        let [channels, height, width] = input.shape();
        let data = TensorData::new(input.data().to_vec(), [1, channels, height, width]);
        let x = Tensor::<B, 4>::from_data(data, &self.device);

        let probabilities: Vec<f32> = self
            .snapshot()?
            .forward_softmax(x)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| FoodVisionError::Inference(format!("{:?}", e)))?;

        Prediction::from_probabilities(&probabilities)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn device(&self) -> Device {
        self.kind
    }
}

/// Load the classifier on the best available device.
///
/// Uses CUDA when it is compiled in and a GPU is present, the CPU otherwise.
pub fn load_classifier(
    path: &Path,
    config: &DenseNetConfig,
    num_classes: usize,
) -> Result<Box<dyn Classify>> {
    let device = backend::select_device();
    let start = Instant::now();

    let classifier: Box<dyn Classify> = match device {
        #[cfg(feature = "cuda")]
        Device::Gpu(id) => Box::new(Classifier::<backend::GpuBackend>::load(
            path,
            config,
            num_classes,
            burn_cuda::CudaDevice::new(id),
            device,
        )?),
        _ => Box::new(Classifier::<CpuBackend>::load(
            path,
            config,
            num_classes,
            Default::default(),
            Device::Cpu,
        )?),
    };

    info!(
        "Loaded classifier from {:?} on {} in {}",
        path,
        backend::backend_name(classifier.device()),
        format_millis(start.elapsed().as_secs_f64())
    );

    Ok(classifier)
}
