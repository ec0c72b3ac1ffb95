use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use solara_core::PipelineError;

#[derive(Debug)]
pub enum AppError {
    Pipeline(PipelineError),
    Anyhow(anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Pipeline(err) => match err {
                PipelineError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                PipelineError::UpstreamConflict(msg) | PipelineError::UpstreamRejection(msg) => {
                    (StatusCode::CONFLICT, msg)
                }
                PipelineError::Transport(msg) => {
                    tracing::error!("Upstream transport failure: {}", msg);
                    (StatusCode::BAD_GATEWAY, msg)
                }
                PipelineError::Persistence(msg) => {
                    tracing::error!("Persistence failure: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
