use thiserror::Error;

/// Core error type for the wirec engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scan error in '{path}': {message}")]
    Scan { path: String, message: String },

    #[error("Missing implementation for '{token}' (required by {required_by})")]
    MissingImplementation { token: String, required_by: String },

    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl EngineError {
    /// Create a new scan error
    pub fn scan(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scan {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Check if the error is fatal to a generation pass
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Scan { .. })
    }
}
