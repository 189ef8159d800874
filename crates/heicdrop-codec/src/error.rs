//! Error types for heicdrop-codec.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The decoder exited successfully but wrote no image.
    #[error("{tool} produced no image")]
    NoOutput { tool: String },

    /// The decoded image could not be loaded or encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Workspace error.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// A blocking encode task panicked or was cancelled.
    #[error("encoder task failed: {0}")]
    Task(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// The human-readable cause, without the tool prefix, when one exists.
    ///
    /// A decoder that fails without printing anything yields `None`, letting
    /// callers substitute their own wording.
    pub fn cause(&self) -> Option<String> {
        match self {
            Self::ToolFailed { message, .. } => {
                let message = message.trim();
                (!message.is_empty()).then(|| message.to_string())
            }
            Self::NoOutput { .. } => None,
            other => Some(other.to_string()),
        }
    }
}
