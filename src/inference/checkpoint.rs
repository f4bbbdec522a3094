//! Checkpoint loading
//!
//! Two on-disk formats hold the classifier weights:
//! - the PyTorch state dict the model was trained into (`.pth` / `.pt`),
//!   read directly with torchvision DenseNet key names
//! - a Burn `CompactRecorder` file (`.mpk`), produced by the
//!   `convert_checkpoint` tool for faster startup
//!
//! Either way the record is read first, its head width checked against the
//! class count, and only then loaded into the model.

use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{CompactRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::Backend,
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use tracing::debug;

use crate::model::densenet::FoodClassifierRecord;
use crate::model::{DenseNetConfig, FoodClassifier};
use crate::utils::error::{FoodVisionError, Result};

/// On-disk weight format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointFormat {
    /// PyTorch state dict
    PyTorch,
    /// Burn `CompactRecorder` record
    Burn,
}

impl CheckpointFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("pth") | Some("pt") => CheckpointFormat::PyTorch,
            _ => CheckpointFormat::Burn,
        }
    }

    /// File actually read for `path`. The Burn recorder always reads
    /// `<stem>.mpk`, whatever extension was configured.
    pub fn file_for(self, path: &Path) -> PathBuf {
        match self {
            CheckpointFormat::PyTorch => path.to_path_buf(),
            CheckpointFormat::Burn => path.with_extension("mpk"),
        }
    }
}

/// Resolve the checkpoint file and its format, failing if it does not exist
pub fn resolve_checkpoint(path: &Path) -> Result<(PathBuf, CheckpointFormat)> {
    let format = CheckpointFormat::from_path(path);
    let resolved = format.file_for(path);
    if resolved.is_file() {
        Ok((resolved, format))
    } else {
        Err(FoodVisionError::PathNotFound(resolved))
    }
}

/// Key renames from torchvision's DenseNet state dict to [`FoodClassifier`].
///
/// torchvision numbers blocks and layers from 1, Burn's module lists from 0,
/// so every block, layer and transition gets its own pattern.
pub fn pytorch_key_remaps(config: &DenseNetConfig) -> Vec<(String, String)> {
    let mut remaps = vec![
        (r"^features\.conv0\.(.+)$".to_string(), "stem.conv.${1}".to_string()),
        (r"^features\.norm0\.(.+)$".to_string(), "stem.norm.${1}".to_string()),
    ];

    let num_blocks = config.block_config.len();
    for (block, &layers) in config.block_config.iter().enumerate() {
        for layer in 0..layers {
            remaps.push((
                format!(r"^features\.denseblock{}\.denselayer{}\.(.+)$", block + 1, layer + 1),
                format!("blocks.{}.layers.{}.${{1}}", block, layer),
            ));
        }
        if block + 1 < num_blocks {
            remaps.push((
                format!(r"^features\.transition{}\.(.+)$", block + 1),
                format!("transitions.{}.${{1}}", block),
            ));
        }
    }

    remaps.extend([
        (r"^features\.norm5\.(.+)$".to_string(), "norm_final.${1}".to_string()),
        // classifier = Sequential(Linear, ReLU, Dropout, Linear)
        (r"^classifier\.0\.(.+)$".to_string(), "head.fc1.${1}".to_string()),
        (r"^classifier\.3\.(.+)$".to_string(), "head.fc2.${1}".to_string()),
    ]);

    remaps
}

fn load_record<B: Backend>(
    path: &Path,
    format: CheckpointFormat,
    config: &DenseNetConfig,
    device: &B::Device,
) -> Result<FoodClassifierRecord<B>> {
    let record = match format {
        CheckpointFormat::PyTorch => {
            let args = pytorch_key_remaps(config)
                .iter()
                .fold(LoadArgs::new(path.to_path_buf()), |args, (pattern, replacement)| {
                    args.with_key_remap(pattern, replacement)
                });
            PyTorchFileRecorder::<FullPrecisionSettings>::default().load(args, device)
        }
        CheckpointFormat::Burn => CompactRecorder::new().load(path.to_path_buf(), device),
    };

    record.map_err(|e| {
        FoodVisionError::Model(format!("Failed to load checkpoint {:?}: {:?}", path, e))
    })
}

/// Build the topology and load a checkpoint into it.
///
/// The checkpoint's output layer must have exactly `num_classes` rows.
pub fn load_model<B: Backend>(
    path: &Path,
    format: CheckpointFormat,
    config: &DenseNetConfig,
    num_classes: usize,
    device: &B::Device,
) -> Result<FoodClassifier<B>> {
    config.validate().map_err(FoodVisionError::Config)?;

    let record = load_record::<B>(path, format, config, device)?;
    let [_, width] = record.head.fc2.weight.val().dims();
    if width != num_classes {
        return Err(FoodVisionError::Model(format!(
            "checkpoint head has {} outputs but the class index has {} classes",
            width, num_classes
        )));
    }
    debug!("Checkpoint {:?} ({:?}) has {} outputs", path, format, width);

    Ok(FoodClassifier::new(config, num_classes, device).load_record(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use regex::Regex;

    const TINY_STATE_DICT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/tiny_densenet.pth");

    /// Apply the remaps in order, the way the PyTorch recorder does
    fn remap(key: &str, remaps: &[(String, String)]) -> String {
        remaps.iter().fold(key.to_string(), |key, (pattern, replacement)| {
            Regex::new(pattern)
                .unwrap()
                .replace_all(&key, replacement.as_str())
                .into_owned()
        })
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            CheckpointFormat::from_path(Path::new("models/foodmodel_torch.pth")),
            CheckpointFormat::PyTorch
        );
        assert_eq!(CheckpointFormat::from_path(Path::new("m.pt")), CheckpointFormat::PyTorch);
        assert_eq!(
            CheckpointFormat::from_path(Path::new("models/foodmodel.mpk")),
            CheckpointFormat::Burn
        );
        assert_eq!(
            CheckpointFormat::Burn.file_for(Path::new("models/foodmodel")),
            PathBuf::from("models/foodmodel.mpk")
        );
    }

    #[test]
    fn test_densenet201_key_remaps() {
        let remaps = pytorch_key_remaps(&DenseNetConfig::densenet201());
        let cases = [
            ("features.conv0.weight", "stem.conv.weight"),
            ("features.norm0.running_var", "stem.norm.running_var"),
            ("features.denseblock1.denselayer1.norm1.weight", "blocks.0.layers.0.norm1.weight"),
            ("features.denseblock1.denselayer6.conv2.weight", "blocks.0.layers.5.conv2.weight"),
            ("features.denseblock3.denselayer10.conv1.weight", "blocks.2.layers.9.conv1.weight"),
            ("features.denseblock3.denselayer48.norm2.bias", "blocks.2.layers.47.norm2.bias"),
            ("features.denseblock4.denselayer32.conv2.weight", "blocks.3.layers.31.conv2.weight"),
            ("features.transition1.conv.weight", "transitions.0.conv.weight"),
            ("features.transition3.norm.running_mean", "transitions.2.norm.running_mean"),
            ("features.norm5.bias", "norm_final.bias"),
            ("classifier.0.weight", "head.fc1.weight"),
            ("classifier.3.bias", "head.fc2.bias"),
        ];

        for (torch_key, burn_key) in cases {
            assert_eq!(remap(torch_key, &remaps), burn_key, "{}", torch_key);
        }
    }

    #[test]
    fn test_remaps_follow_block_layout() {
        let remaps = pytorch_key_remaps(&DenseNetConfig::densenet201());
        // stem (2) + layers + transitions (3) + final norm and head (3)
        assert_eq!(remaps.len(), 2 + (6 + 12 + 48 + 32) + 3 + 3);
        assert_eq!(
            remap("features.transition4.conv.weight", &remaps),
            "features.transition4.conv.weight"
        );
    }

    #[test]
    fn test_load_pytorch_state_dict() {
        let device = Default::default();
        let (path, format) = resolve_checkpoint(Path::new(TINY_STATE_DICT)).unwrap();
        assert_eq!(format, CheckpointFormat::PyTorch);

        let model =
            load_model::<CpuBackend>(&path, format, &DenseNetConfig::tiny(), 2, &device).unwrap();
        assert_eq!(model.head.output_width(), 2);

        // The stored output bias strongly favours class 1
        let input = burn::tensor::Tensor::<CpuBackend, 4>::zeros([1, 3, 32, 32], &device);
        let probabilities: Vec<f32> = model
            .forward_softmax(input)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap();
        assert!(probabilities[1] > 0.99);
    }

    #[test]
    fn test_pytorch_head_width_mismatch() {
        let device = Default::default();
        let result = load_model::<CpuBackend>(
            Path::new(TINY_STATE_DICT),
            CheckpointFormat::PyTorch,
            &DenseNetConfig::tiny(),
            3,
            &device,
        );
        assert!(matches!(result, Err(FoodVisionError::Model(_))));
    }

    #[test]
    fn test_burn_checkpoint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodmodel");
        let device = Default::default();

        FoodClassifier::<CpuBackend>::new(&DenseNetConfig::tiny(), 4, &device)
            .save_file(path.clone(), &CompactRecorder::new())
            .unwrap();

        let (resolved, format) = resolve_checkpoint(&path).unwrap();
        assert_eq!(resolved, path.with_extension("mpk"));
        assert_eq!(format, CheckpointFormat::Burn);

        let model =
            load_model::<CpuBackend>(&resolved, format, &DenseNetConfig::tiny(), 4, &device)
                .unwrap();
        assert_eq!(model.num_classes(), 4);

        let err = load_model::<CpuBackend>(&resolved, format, &DenseNetConfig::tiny(), 5, &device)
            .unwrap_err();
        assert!(matches!(err, FoodVisionError::Model(_)));
    }

    #[test]
    fn test_truncated_checkpoint_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodmodel.mpk");
        std::fs::write(&path, [0x85, 0xa4, 0x73]).unwrap();

        let device = Default::default();
        let result =
            load_model::<CpuBackend>(&path, CheckpointFormat::Burn, &DenseNetConfig::tiny(), 4, &device);
        assert!(matches!(result, Err(FoodVisionError::Model(_))));
    }

    #[test]
    fn test_resolve_missing_checkpoint() {
        let err = resolve_checkpoint(Path::new("/nonexistent/foodmodel.mpk")).unwrap_err();
        assert!(matches!(err, FoodVisionError::PathNotFound(_)));

        let err = resolve_checkpoint(Path::new("/nonexistent/foodmodel_torch.pth")).unwrap_err();
        assert!(matches!(err, FoodVisionError::PathNotFound(_)));
    }
}
