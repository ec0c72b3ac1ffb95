pub mod order;
pub mod repository;
pub mod routing;

/// Failure taxonomy for a single request through the pipeline.
///
/// Conflicts recovered by the orchestrator's one-shot retries never
/// reach the caller; everything else is reported as a structured
/// `{success: false, message}` result at the handler boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Upstream conflict: {0}")]
    UpstreamConflict(String),
    #[error("Upstream rejection: {0}")]
    UpstreamRejection(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
