use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use solara_core::PipelineError;
use solara_store::drive::UploadFile;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/uploads", post(upload_files))
}

/// Accept one or more multipart file parts and push them to the drive
/// folder. Per-file failures are reported per entry; `success` is true
/// only when every file got a link.
async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            // Non-file parts (plain form fields) are ignored
            continue;
        };
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| PipelineError::Validation(format!("Failed to read upload: {}", e)))?;

        files.push(UploadFile {
            name: file_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(PipelineError::Validation(
            "No files found in the upload request".to_string(),
        )
        .into());
    }

    let outcomes = state.drive.upload_batch(&files).await;

    let mut entries = Vec::with_capacity(outcomes.len());
    let mut all_ok = true;
    for (name, outcome) in outcomes {
        match outcome {
            Ok(url) => {
                info!(file = %name, url = %url, "upload completed");
                entries.push(json!({ "name": name, "url": url }));
            }
            Err(err) => {
                warn!(file = %name, error = %err, "upload failed");
                all_ok = false;
                entries.push(json!({ "name": name, "error": err.to_string() }));
            }
        }
    }

    Ok(Json(json!({ "success": all_ok, "files": entries })))
}
