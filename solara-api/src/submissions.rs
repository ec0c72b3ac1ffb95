use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRequest {
    /// Set by the client when a later form joins an existing record.
    #[serde(default)]
    submission_id: Option<Uuid>,
    payload: Value,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/submissions/project", post(submit_project))
        .route("/v1/submissions/survey", post(submit_survey))
        .route("/v1/submissions/{id}", get(get_submission))
}

async fn submit_project(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> Result<Json<Value>, AppError> {
    let id = req.submission_id.unwrap_or_else(Uuid::new_v4);
    let lead = state.relay.relay_intake(id, &req.payload).await?;

    info!(submission_id = %id, "project intake accepted");
    Ok(Json(json!({
        "success": true,
        "submissionId": id,
        "lead": lead,
    })))
}

async fn submit_survey(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> Result<Json<Value>, AppError> {
    let id = req.submission_id.unwrap_or_else(Uuid::new_v4);
    state.relay.relay_survey(id, &req.payload).await?;

    info!(submission_id = %id, "survey booking accepted");
    Ok(Json(json!({
        "success": true,
        "submissionId": id,
    })))
}

async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    match state.relay.fetch(id).await? {
        Some(submission) => Ok(Json(json!({
            "success": true,
            "submission": submission,
        }))
        .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": format!("No submission found for id {}", id),
            })),
        )
            .into_response()),
    }
}
