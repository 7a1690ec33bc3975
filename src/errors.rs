//! File-scoped error taxonomy
//!
//! Every failure here is attributable to a single file or a single external
//! tool call; none of them abort the batch. The pipeline converts these into
//! diagnostics on the affected file's report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// Source failed to parse; analysis for the file stops here.
    #[error("parse error: {0}")]
    Parse(String),

    /// A rewrite produced output that no longer parses; the original text
    /// must be kept.
    #[error("rewrite verification failed: {0}")]
    RewriteVerification(String),

    /// The external tool is not installed or was disabled by configuration.
    #[error("{tool} not found. Please install it first.")]
    ToolUnavailable { tool: String },

    /// The external tool ran but exited abnormally or timed out.
    #[error("{tool} failed: {message}")]
    ToolFailure { tool: String, message: String },

    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

impl FileError {
    pub fn tool_unavailable(tool: impl Into<String>) -> Self {
        Self::ToolUnavailable { tool: tool.into() }
    }

    pub fn tool_failure(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
