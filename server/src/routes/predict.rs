//! Prediction endpoint

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use food_vision::service::{handle_predict, JsonReply};
use serde_json::json;
use tracing::{error, warn};

use super::json_response;
use crate::state::SharedState;

/// Read every file part of the form. Plain text fields are ignored, and the
/// first file wins when a field name repeats.
async fn collect_files(
    mut multipart: Multipart,
) -> Result<HashMap<String, Vec<u8>>, MultipartError> {
    let mut files = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_none() {
            continue;
        }

        let bytes = field.bytes().await?;
        files.entry(name).or_insert_with(|| bytes.to_vec());
    }

    Ok(files)
}

/// POST /predict - Classify the uploaded `image` file
///
/// A request that is not multipart at all has no uploaded files, so it gets
/// the same "No image uploaded" reply as a form without the field.
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Option<Multipart>,
) -> Response {
    let files = match multipart {
        Some(multipart) => match collect_files(multipart).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Rejected malformed upload: {}", e);
                let status = e.status();
                return (status, Json(json!({ "error": e.body_text() }))).into_response();
            }
        },
        None => HashMap::new(),
    };

    let task_state = state.clone();
    let reply = tokio::task::spawn_blocking(move || handle_predict(&task_state.context, &files))
        .await
        .unwrap_or_else(|e| {
            error!("Prediction task failed: {}", e);
            JsonReply {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                body: json!({ "error": "Prediction failed" }),
            }
        });

    json_response(reply)
}
