use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("{} schema validation error(s): {}", .0.len(), .0.join("; "))]
    Schema(Vec<String>),

    #[error("Validation failed for {sidecar}: {}", errors.join("; "))]
    ValidationFailed { sidecar: String, errors: Vec<String> },

    #[error("No rows provided to write for {sidecar}")]
    EmptyRows { sidecar: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown sidecar type: {0}")]
    UnknownSidecar(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, SidecarError>;

/// Failures reported by the remote package API collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Package not found: {0}")]
    NotFound(String),
}
