//! Inference handler
//!
//! Framework-independent request handling: the HTTP layer hands over the
//! uploaded files and gets back a JSON body with a status code.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::utils::error::{FoodVisionError, Result};

use super::context::ServiceContext;
use super::response::FoodPrediction;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Message returned by the liveness endpoint
pub const STATUS_MESSAGE: &str = "Food Classification API is running 🚀";

/// Uploaded files of one request, by form field name
pub trait UploadedFiles {
    fn file(&self, field: &str) -> Option<&[u8]>;
}

impl UploadedFiles for HashMap<String, Vec<u8>> {
    fn file(&self, field: &str) -> Option<&[u8]> {
        self.get(field).map(Vec::as_slice)
    }
}

/// A JSON body with an HTTP status code
#[derive(Debug, Clone, PartialEq)]
pub struct JsonReply {
    pub status: u16,
    pub body: Value,
}

impl JsonReply {
    pub fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::from_error(&FoodVisionError::from(e)),
        }
    }

    /// `{"error": message}` with the error's status code
    pub fn from_error(err: &FoodVisionError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

/// `GET /` body
pub fn status_reply() -> JsonReply {
    JsonReply {
        status: 200,
        body: json!({ "message": STATUS_MESSAGE }),
    }
}

/// Run one prediction: validate, decode, preprocess, infer, enrich
pub fn predict(context: &ServiceContext, upload: &impl UploadedFiles) -> Result<FoodPrediction> {
    let bytes = upload
        .file(IMAGE_FIELD)
        .ok_or(FoodVisionError::MissingImage)?;

    let result = context.predict_bytes(bytes)?;
    debug!(
        "Predicted '{}' (class {}) with confidence {:.4}",
        result.label, result.class_index, result.confidence
    );

    Ok(result.into_response())
}

/// `POST /predict`: every failure becomes a JSON error reply
pub fn handle_predict(context: &ServiceContext, upload: &impl UploadedFiles) -> JsonReply {
    match predict(context, upload) {
        Ok(prediction) => JsonReply::ok(&prediction),
        Err(err) => {
            if err.is_client_error() {
                warn!("Rejected prediction request: {}", err);
            } else {
                error!("Prediction failed: {}", err);
            }
            JsonReply::from_error(&err)
        }
    }
}
