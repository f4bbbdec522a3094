//! Image preprocessing
//!
//! Converts an uploaded image into the normalized CHW tensor the classifier
//! was trained on: RGB, 224x224, scaled to [0, 1], then normalized with the
//! ImageNet channel statistics.

use image::{imageops::FilterType, DynamicImage, ImageBuffer, Rgb, RgbImage};

use crate::utils::error::{FoodVisionError, Result};

/// ImageNet normalization mean values (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Input resolution the classifier was trained at
pub const INPUT_SIZE: u32 = 224;

/// A single preprocessed image in CHW layout
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl ImageTensor {
    /// [channels, height, width]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Decode uploaded bytes into an image, guessing the format from content
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(FoodVisionError::ImageDecode("empty upload".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Deterministic, stateless image -> tensor transform
#[derive(Debug, Clone)]
pub struct Preprocessor {
    size: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            size: INPUT_SIZE,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl Preprocessor {
    /// Preprocess an image for inference.
    ///
    /// Grayscale, paletted and alpha images are coerced to RGB first.
    pub fn preprocess(&self, image: &DynamicImage) -> ImageTensor {
        let rgb = image.to_rgb8();
        let resized = self.resize(rgb);
        let data = self.normalize(&resized);

        ImageTensor {
            data,
            shape: [3, self.size as usize, self.size as usize],
        }
    }

    /// Resize to the square input size; images already at size pass through
    fn resize(&self, image: RgbImage) -> RgbImage {
        if image.dimensions() == (self.size, self.size) {
            return image;
        }
        image::imageops::resize(&image, self.size, self.size, FilterType::Triangle)
    }

    /// Scale to [0, 1] and normalize per channel, returning CHW layout
    fn normalize(&self, image: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Vec<f32> {
        let (width, height) = image.dimensions();
        let num_pixels = (width * height) as usize;

        let mut normalized = vec![0.0f32; 3 * num_pixels];

        for (i, pixel) in image.pixels().enumerate() {
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                normalized[c * num_pixels + i] = (value - self.mean[c]) / self.std[c];
            }
        }

        normalized
    }
}

#[cfg(test)]
impl ImageTensor {
    /// Value at channel `c`, row `y`, column `x`
    pub fn get(&self, c: usize, y: usize, x: usize) -> Option<f32> {
        let [channels, height, width] = self.shape;
        if c >= channels || y >= height || x >= width {
            return None;
        }
        self.data.get(c * height * width + y * width + x).copied()
    }
}
