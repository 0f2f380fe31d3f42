use std::io;

use crate::types::ToolName;

/// Errors that can occur while resolving, running or parsing an external tool
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No local {interpreter} configured or found for {tool}")]
    ToolNotFound {
        tool: ToolName,
        interpreter: &'static str,
    },

    #[error("Failed to start {program}: {source}")]
    ProcessSpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Unknown Error: {0}")]
    OutputParseAnomaly(String),

    #[error("{label} failure: {message}")]
    WorkerThreadFault { label: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for checkrunner operations
pub type Result<T> = std::result::Result<T, Error>;
