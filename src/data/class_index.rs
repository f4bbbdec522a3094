//! Class index map
//!
//! Maps the classifier's output positions to food labels. The source file
//! is a JSON object `{"label": index}` written at training time.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::utils::error::{FoodVisionError, Result};

/// Immutable index -> label mapping.
///
/// Indices are guaranteed to cover `0..len()` exactly once, so every output
/// position of a head sized with [`ClassIndex::len`] resolves to a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndex {
    labels: Vec<String>,
}

impl ClassIndex {
    /// Build from a label -> index map, checking the indices are dense
    pub fn from_map(map: HashMap<String, usize>) -> Result<Self> {
        if map.is_empty() {
            return Err(FoodVisionError::ClassIndex(
                "class index map is empty".to_string(),
            ));
        }

        let mut slots: Vec<Option<String>> = vec![None; map.len()];
        for (label, &index) in &map {
            let slot = slots.get_mut(index).ok_or_else(|| {
                FoodVisionError::ClassIndex(format!(
                    "index {} for '{}' is outside 0..{}",
                    index,
                    label,
                    map.len()
                ))
            })?;
            if let Some(existing) = slot {
                return Err(FoodVisionError::ClassIndex(format!(
                    "index {} is assigned to both '{}' and '{}'",
                    index, existing, label
                )));
            }
            *slot = Some(label.clone());
        }

        // The map has len() entries and no duplicate slots, so every slot is filled
        let labels: Vec<String> = slots.into_iter().flatten().collect();

        Ok(Self { labels })
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: HashMap<String, usize> = serde_json::from_str(json)
            .map_err(|e| FoodVisionError::ClassIndex(format!("invalid JSON: {}", e)))?;
        Self::from_map(map)
    }

    /// Load from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FoodVisionError::PathNotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let map: HashMap<String, usize> = serde_json::from_reader(reader).map_err(|e| {
            FoodVisionError::ClassIndex(format!("failed to parse {:?}: {}", path, e))
        })?;
        let index = Self::from_map(map)?;

        info!("Loaded {} classes from {:?}", index.len(), path);
        Ok(index)
    }

    /// Number of classes (width of the classifier's output layer)
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a successfully built index
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for a predicted index
    pub fn label_for_index(&self, index: usize) -> Result<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(FoodVisionError::UnknownIndex(index))
    }

    /// Labels in index order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_json_inverts_map() {
        let index =
            ClassIndex::from_json_str(r#"{"pizza": 1, "apple_pie": 0, "grilled_chicken": 2}"#)
                .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.label_for_index(0).unwrap(), "apple_pie");
        assert_eq!(index.label_for_index(2).unwrap(), "grilled_chicken");
        assert_eq!(index.label_for_index(1).unwrap(), "pizza");
        assert_eq!(
            index.labels().collect::<Vec<_>>(),
            vec!["apple_pie", "pizza", "grilled_chicken"]
        );
    }

    #[test]
    fn test_unknown_index() {
        let index = ClassIndex::from_json_str(r#"{"pizza": 0}"#).unwrap();
        let err = index.label_for_index(5).unwrap_err();
        assert!(matches!(err, FoodVisionError::UnknownIndex(5)));
    }

    #[test]
    fn test_rejects_gaps_and_duplicates() {
        assert!(ClassIndex::from_json_str(r#"{"a": 0, "b": 2}"#).is_err());
        assert!(ClassIndex::from_json_str(r#"{"a": 1, "b": 1}"#).is_err());
        assert!(ClassIndex::from_json_str("{}").is_err());
        assert!(ClassIndex::from_json_str(r#"{"a": -1}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sushi": 0, "ramen": 1}}"#).unwrap();

        let index = ClassIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.label_for_index(1).unwrap(), "ramen");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClassIndex::load(Path::new("/nonexistent/class_indices.json")).unwrap_err();
        assert!(matches!(err, FoodVisionError::PathNotFound(_)));
    }
}
