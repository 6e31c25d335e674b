use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarbourError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode declaration: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Upstream {uri} failed: {reason}")]
    Upstream { uri: String, reason: String },

    #[error("Failed to start background instance: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Process lookup failed: {0}")]
    ProcessLookup(String),

    #[error("{0} container operation(s) failed")]
    PartialFailure(usize),
}

pub type HarbourResult<T> = Result<T, HarbourError>;

impl HarbourError {
    pub fn configuration(message: impl Into<String>) -> Self {
        HarbourError::Engine(EngineError::Configuration(message.into()))
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarbourError::Io { path: path.into(), source }
    }
}

// Gateway integration: only upstream failures ever reach a client
impl IntoResponse for HarbourError {
    fn into_response(self) -> Response {
        let status = match &self {
            HarbourError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, format!("{}: {}", status, self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failure_is_bad_gateway() {
        let err = HarbourError::Upstream {
            uri: "http://localhost:8080/api".to_string(),
            reason: "connection refused".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_engine_errors_keep_their_message() {
        let err: HarbourError = EngineError::NotFound("ghost".to_string()).into();
        assert_eq!(err.to_string(), "Container not found: ghost");
    }

    #[test]
    fn test_configuration_helper_wraps_engine_variant() {
        let err = HarbourError::configuration("bad file");
        assert!(matches!(err, HarbourError::Engine(EngineError::Configuration(_))));
    }
}
