use thiserror::Error;
use wirec_core::EngineError;

/// Error type for the codegen crate
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] EngineError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Artifact directory is locked: {path}")]
    Locked { path: String },

    #[error("Validation failed with {} error(s): {}", errors.len(), errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Failed to transform '{candidate}': {message}")]
    Transformation { candidate: String, message: String },
}

impl CodegenError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transformation(candidate: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transformation {
            candidate: candidate.into(),
            message: message.into(),
        }
    }
}
