//! Prediction results and their JSON response shape

use serde::{Deserialize, Serialize};

use crate::data::NutritionRecord;
use crate::utils::round2;

/// Outcome of one classification, before response shaping
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Raw label from the class index (nutrition lookup key)
    pub label: String,
    /// Title-cased label for display
    pub display_name: String,
    /// Predicted class index
    pub class_index: usize,
    /// Softmax probability in [0, 1]
    pub confidence: f32,
    /// Nutrition facts, empty when the label has none
    pub nutrition: NutritionRecord,
}

impl PredictionResult {
    /// Confidence as a percentage rounded to two decimals
    pub fn confidence_percent(&self) -> f64 {
        round2(f64::from(self.confidence) * 100.0).clamp(0.0, 100.0)
    }

    /// Shape the result into the response body
    pub fn into_response(self) -> FoodPrediction {
        FoodPrediction {
            confidence: self.confidence_percent(),
            food_name: self.display_name,
            nutrition_per_100g: self.nutrition,
        }
    }
}

/// Body of a successful `/predict` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPrediction {
    pub food_name: String,
    /// Percentage in [0, 100] with two decimals
    pub confidence: f64,
    pub nutrition_per_100g: NutritionRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(confidence: f32) -> PredictionResult {
        PredictionResult {
            label: "grilled_chicken".to_string(),
            display_name: "Grilled Chicken".to_string(),
            class_index: 3,
            confidence,
            nutrition: NutritionRecord::default(),
        }
    }

    #[test]
    fn test_confidence_percent_rounding() {
        assert_eq!(result(0.87654).confidence_percent(), 87.65);
        assert_eq!(result(1.0).confidence_percent(), 100.0);
        assert_eq!(result(0.0).confidence_percent(), 0.0);
        assert_eq!(result(0.123449).confidence_percent(), 12.34);
    }

    #[test]
    fn test_response_json_shape() {
        let body = serde_json::to_value(result(0.5).into_response()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "food_name": "Grilled Chicken",
                "confidence": 50.0,
                "nutrition_per_100g": {}
            })
        );
    }
}
