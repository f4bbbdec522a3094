//! Service context
//!
//! Everything loaded once at startup and shared read-only by every request:
//! the classifier, the class index map, the nutrition table and the
//! preprocessing transform.

use std::time::Instant;

use tracing::{debug, info};

use crate::backend::{self, Device};
use crate::config::AssetPaths;
use crate::data::{display_name, ClassIndex, NutritionTable};
use crate::inference::{decode_image, load_classifier, Classify, Preprocessor};
use crate::model::DenseNetConfig;
use crate::utils::error::{FoodVisionError, Result};

use super::response::PredictionResult;

/// Immutable per-process inference state
pub struct ServiceContext {
    classifier: Box<dyn Classify>,
    class_index: ClassIndex,
    nutrition: NutritionTable,
    preprocessor: Preprocessor,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("classes", &self.class_index.len())
            .field("nutrition_labels", &self.nutrition.len())
            .field("device", &self.classifier.device())
            .finish()
    }
}

impl ServiceContext {
    /// Assemble a context from already loaded parts.
    ///
    /// Fails if the classifier's output width differs from the class count.
    pub fn new(
        classifier: Box<dyn Classify>,
        class_index: ClassIndex,
        nutrition: NutritionTable,
    ) -> Result<Self> {
        if classifier.num_classes() != class_index.len() {
            return Err(FoodVisionError::Model(format!(
                "classifier has {} outputs but the class index has {} classes",
                classifier.num_classes(),
                class_index.len()
            )));
        }

        Ok(Self {
            classifier,
            class_index,
            nutrition,
            preprocessor: Preprocessor::default(),
        })
    }

    /// Load every startup asset with the DenseNet-201 topology
    pub fn load(paths: &AssetPaths) -> Result<Self> {
        Self::load_with_config(paths, &DenseNetConfig::densenet201())
    }

    /// Load every startup asset with a custom topology
    pub fn load_with_config(paths: &AssetPaths, config: &DenseNetConfig) -> Result<Self> {
        paths.validate()?;
        let start = Instant::now();

        let class_index = ClassIndex::load(&paths.class_index)?;
        let nutrition = NutritionTable::load(&paths.nutrition)?;
        let classifier = load_classifier(&paths.model, config, class_index.len())?;

        let missing = class_index
            .labels()
            .filter(|label| nutrition.lookup(label).is_empty())
            .count();
        if missing > 0 {
            info!("{} of {} classes have no nutrition data", missing, class_index.len());
        }

        info!(
            "Service context ready in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Self::new(classifier, class_index, nutrition)
    }

    /// Classify raw upload bytes and enrich the result with nutrition facts
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<PredictionResult> {
        let image = decode_image(bytes)?;
        debug!("Decoded {}x{} image", image.width(), image.height());

        let tensor = self.preprocessor.preprocess(&image);
        let prediction = self.classifier.predict(&tensor)?;
        let label = self.class_index.label_for_index(prediction.index)?;

        // Lookup uses the raw label; the display form is for the response only
        let nutrition = self.nutrition.lookup(label);

        Ok(PredictionResult {
            label: label.to_string(),
            display_name: display_name(label),
            class_index: prediction.index,
            confidence: prediction.confidence,
            nutrition,
        })
    }

    pub fn class_index(&self) -> &ClassIndex {
        &self.class_index
    }

    pub fn nutrition(&self) -> &NutritionTable {
        &self.nutrition
    }

    /// Device the classifier runs on
    pub fn device(&self) -> Device {
        self.classifier.device()
    }

    /// Human-readable backend name
    pub fn backend_name(&self) -> &'static str {
        backend::backend_name(self.classifier.device())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use crate::model::FoodClassifier;
    use burn::module::Module;
    use burn::record::CompactRecorder;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    const CLASSES: &str = r#"{"apple_pie": 0, "grilled_chicken": 1}"#;
    const NUTRITION: &str = "label,calories,protein\nGrilled Chicken,165,31\n";

    /// Write a complete asset set whose checkpoint has `num_classes` outputs
    fn write_assets(root: &Path, num_classes: usize) -> AssetPaths {
        let paths = AssetPaths {
            model: root.join("foodmodel.mpk"),
            class_index: root.join("class_indices.json"),
            nutrition: root.join("food_nutrition_map.csv"),
        };

        let device = Default::default();
        FoodClassifier::<CpuBackend>::new(&DenseNetConfig::tiny(), num_classes, &device)
            .save_file(paths.model.clone(), &CompactRecorder::new())
            .unwrap();
        fs::write(&paths.class_index, CLASSES).unwrap();
        fs::write(&paths.nutrition, NUTRITION).unwrap();

        paths
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 20, Rgb([120, 80, 40])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_assets(dir.path(), 2);

        let context = ServiceContext::load_with_config(&paths, &DenseNetConfig::tiny()).unwrap();
        assert_eq!(context.class_index().len(), 2);
        assert_eq!(context.nutrition().len(), 1);
        assert_eq!(context.device(), Device::Cpu);

        let result = context.predict_bytes(&png_bytes()).unwrap();
        assert!(result.class_index < 2);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(context.predict_bytes(&png_bytes()).unwrap(), result);
    }

    #[test]
    fn test_load_rejects_truncated_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_assets(dir.path(), 2);

        let bytes = fs::read(&paths.model).unwrap();
        fs::write(&paths.model, &bytes[..bytes.len() / 3]).unwrap();

        let result = ServiceContext::load_with_config(&paths, &DenseNetConfig::tiny());
        assert!(matches!(result, Err(FoodVisionError::Model(_))));
    }

    #[test]
    fn test_load_rejects_head_width_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_assets(dir.path(), 3);

        let result = ServiceContext::load_with_config(&paths, &DenseNetConfig::tiny());
        assert!(matches!(result, Err(FoodVisionError::Model(_))));
    }

    #[test]
    fn test_load_reports_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceContext::load(&AssetPaths::under(dir.path()));
        assert!(matches!(result, Err(FoodVisionError::Config(_))));
    }
}
