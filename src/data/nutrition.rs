//! Nutrition table
//!
//! Per-100g nutrition facts keyed by food label, loaded from a CSV file with
//! a `label` column. Every other column is passed through to responses as-is.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::utils::error::{FoodVisionError, Result};

/// Name of the column holding the food label
pub const LABEL_COLUMN: &str = "label";

/// A single cell of the nutrition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutritionValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl NutritionValue {
    /// Type a raw CSV cell: integers, then floats, then text. Empty is null.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NutritionValue::Null;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return NutritionValue::Integer(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => NutritionValue::Float(value),
            Ok(_) => NutritionValue::Null,
            Err(_) => NutritionValue::Text(raw.to_string()),
        }
    }
}

/// Nutrition facts for one label, field name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionRecord(BTreeMap<String, NutritionValue>);

impl NutritionRecord {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&NutritionValue> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutritionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, NutritionValue)> for NutritionRecord {
    fn from_iter<I: IntoIterator<Item = (String, NutritionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalize a label into a lookup key: trimmed and lowercased
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Read-only nutrition lookup table
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    records: HashMap<String, NutritionRecord>,
}

impl NutritionTable {
    /// Load the table from a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FoodVisionError::PathNotFound(path.to_path_buf()));
        }

        let reader = csv::Reader::from_path(path)
            .map_err(|e| FoodVisionError::Nutrition(format!("failed to open {:?}: {}", path, e)))?;
        let table = Self::from_csv_reader(reader)?;

        info!("Loaded nutrition facts for {} labels from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse the table from in-memory CSV text
    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(csv::Reader::from_reader(text.as_bytes()))
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let label_column = headers
            .iter()
            .position(|h| h == LABEL_COLUMN)
            .ok_or_else(|| {
                FoodVisionError::Nutrition(format!("missing '{}' column", LABEL_COLUMN))
            })?;

        let mut records = HashMap::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let key = normalize_label(record.get(label_column).unwrap_or_default());
            if key.is_empty() {
                warn!("Skipping nutrition row {} with an empty label", row + 1);
                continue;
            }

            let fields: NutritionRecord = headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let value = if col == label_column {
                        NutritionValue::Text(key.clone())
                    } else {
                        NutritionValue::parse(record.get(col).unwrap_or_default())
                    };
                    (name.clone(), value)
                })
                .collect();

            // First row wins for duplicate labels
            records.entry(key).or_insert(fields);
        }

        Ok(Self { records })
    }

    /// Number of labels with nutrition data
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up nutrition facts for a label.
    ///
    /// Case and surrounding whitespace are ignored, and underscores and
    /// spaces are interchangeable. A miss returns an empty record.
    pub fn lookup(&self, label: &str) -> NutritionRecord {
        let key = normalize_label(label);
        if let Some(record) = self.records.get(&key) {
            return record.clone();
        }

        let alternate = if key.contains('_') {
            key.replace('_', " ")
        } else {
            key.replace(' ', "_")
        };

        self.records.get(&alternate).cloned().unwrap_or_default()
    }
}
