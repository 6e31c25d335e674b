//! Error: the engine's error taxonomy.
//!
//! Every fallible engine operation returns [`EngineError`]. Bollard errors are
//! classified here so callers never match on transport details.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The declaration is malformed or misses a mandatory field.
    #[error("Invalid declaration: {0}")]
    Configuration(String),
    /// The runtime could not be reached or the call did not complete.
    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),
    /// The runtime answered, but the inspection payload cannot be mapped.
    #[error("Malformed inspection data for '{id}': {reason}")]
    MalformedInspection { id: String, reason: String },
    /// A create/remove command ran and reported failure.
    #[error("Runtime command failed for '{target}': {reason}")]
    CommandFailed { target: String, reason: String },
    #[error("Container not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Classify a bollard error raised while operating on `target`.
    ///
    /// - HTTP 404 from the daemon → `NotFound`
    /// - any other daemon response → `CommandFailed`
    /// - transport, socket and decoding failures → `RuntimeUnavailable`
    pub fn from_bollard(target: &str, err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as B;
        match err {
            B::DockerResponseServerError { status_code: 404, .. } => {
                EngineError::NotFound(target.to_string())
            }
            B::DockerResponseServerError { status_code, message } => EngineError::CommandFailed {
                target: target.to_string(),
                reason: format!("daemon returned {}: {}", status_code, message),
            },
            B::JsonDataError { message, .. } => EngineError::MalformedInspection {
                id: target.to_string(),
                reason: message,
            },
            other => EngineError::RuntimeUnavailable(other.to_string()),
        }
    }

    /// True for failures that say nothing about a single container and
    /// would recur for every other command as well.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineError::RuntimeUnavailable(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: web".to_string(),
        };
        match EngineError::from_bollard("web", err) {
            EngineError::NotFound(name) => assert_eq!(name, "web"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_conflict_as_command_failure() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message: "removal already in progress".to_string(),
        };
        let mapped = EngineError::from_bollard("web", err);
        assert!(matches!(mapped, EngineError::CommandFailed { .. }));
        assert!(mapped.to_string().contains("409"));
        assert!(!mapped.is_unavailable());
    }

    #[test]
    fn test_display_mentions_target() {
        let err = EngineError::CommandFailed {
            target: "db".to_string(),
            reason: "exit status 125".to_string(),
        };
        assert_eq!(err.to_string(), "Runtime command failed for 'db': exit status 125");
    }
}
