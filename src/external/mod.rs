//! External tool collaborators
//!
//! The formatter and vulnerability scanner are optional capabilities
//! resolved once at startup. The pipeline is written against the traits;
//! the no-op implementations carry the degraded behavior, so no stage
//! branches on tool presence.

mod black;
mod pip_audit;
mod runner;

pub use black::{BlackFormatter, NoFormatter};
pub use pip_audit::{NoScanner, PipAuditScanner};
pub use runner::{is_tool_installed, run_external_tool, ExternalToolResult};

use crate::errors::FileError;

/// Source-formatting capability.
pub trait Formatter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Format the whole source text, returning the replacement text.
    ///
    /// An unavailable tool asks the caller to fall back to the built-in
    /// normalizer; a failed run asks it to continue with the input text.
    fn format(&self, source: &str) -> Result<String, FileError>;
}

/// Dependency vulnerability-scanning capability.
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one scan for the whole invocation, returning report lines.
    /// Degradations are reported in-band as informational lines.
    fn scan(&self) -> Vec<String>;
}
