//! Startup asset configuration
//!
//! Paths of the three files loaded once at startup. Missing files are all
//! reported together before anything is loaded.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::inference::CheckpointFormat;
use crate::utils::error::{FoodVisionError, Result};

/// Default checkpoint location
pub const DEFAULT_MODEL_PATH: &str = "models/foodmodel_torch.pth";
/// Default class index location
pub const DEFAULT_CLASS_INDEX_PATH: &str = "models/class_indices.json";
/// Default nutrition table location
pub const DEFAULT_NUTRITION_PATH: &str = "dataset/food_nutrition_map.csv";

/// Locations of the startup assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Classifier weights: PyTorch state dict (`.pth`) or Burn record (`.mpk`)
    pub model: PathBuf,
    /// JSON label -> index map
    pub class_index: PathBuf,
    /// CSV nutrition table
    pub nutrition: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            class_index: PathBuf::from(DEFAULT_CLASS_INDEX_PATH),
            nutrition: PathBuf::from(DEFAULT_NUTRITION_PATH),
        }
    }
}

impl AssetPaths {
    /// Default asset layout under `root`
    pub fn under(root: &std::path::Path) -> Self {
        let defaults = Self::default();
        Self {
            model: root.join(defaults.model),
            class_index: root.join(defaults.class_index),
            nutrition: root.join(defaults.nutrition),
        }
    }

    /// Check that every asset exists
    pub fn validate(&self) -> Result<()> {
        let model = CheckpointFormat::from_path(&self.model).file_for(&self.model);
        let missing: Vec<String> = [&model, &self.class_index, &self.nutrition]
            .into_iter()
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FoodVisionError::Config(format!(
                "missing startup files: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let paths = AssetPaths::default();
        assert_eq!(paths.model, PathBuf::from("models/foodmodel_torch.pth"));
        assert_eq!(paths.class_index, PathBuf::from("models/class_indices.json"));
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths::under(dir.path());

        let err = paths.validate().unwrap_err().to_string();
        assert!(err.contains("foodmodel_torch.pth"));
        assert!(err.contains("class_indices.json"));
        assert!(err.contains("food_nutrition_map.csv"));
    }

    #[test]
    fn test_validate_accepts_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths::under(dir.path());
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::create_dir_all(dir.path().join("dataset")).unwrap();
        fs::write(&paths.model, b"weights").unwrap();
        fs::write(&paths.class_index, b"{}").unwrap();
        fs::write(&paths.nutrition, b"label\n").unwrap();

        assert!(paths.validate().is_ok());
    }

    #[test]
    fn test_validate_checks_burn_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths {
            model: dir.path().join("foodmodel"),
            class_index: dir.path().join("classes.json"),
            nutrition: dir.path().join("nutrition.csv"),
        };
        fs::write(&paths.class_index, b"{}").unwrap();
        fs::write(&paths.nutrition, b"label\n").unwrap();

        let err = paths.validate().unwrap_err().to_string();
        assert!(err.contains("foodmodel.mpk"));

        fs::write(dir.path().join("foodmodel.mpk"), b"weights").unwrap();
        assert!(paths.validate().is_ok());
    }
}
