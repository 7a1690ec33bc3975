//! Formatter capability backed by black

use super::runner::run_external_tool;
use super::Formatter;
use crate::errors::FileError;

/// Runs `black -` with the source on stdin.
pub struct BlackFormatter {
    timeout_secs: u64,
}

impl BlackFormatter {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Formatter for BlackFormatter {
    fn name(&self) -> &'static str {
        "black"
    }

    fn format(&self, source: &str) -> Result<String, FileError> {
        let cmd = vec![
            "black".to_string(),
            "--quiet".to_string(),
            "-".to_string(),
        ];
        let result = run_external_tool(&cmd, "black", self.timeout_secs, Some(source))?;

        if result.timed_out {
            return Err(FileError::tool_failure(
                "black",
                format!("timed out after {}s", self.timeout_secs),
            ));
        }
        match result.return_code {
            Some(0) => Ok(result.stdout),
            Some(code) => Err(FileError::tool_failure(
                "black",
                format!("exit code {}: {}", code, result.stderr.trim()),
            )),
            None => Err(FileError::tool_failure("black", "killed by signal")),
        }
    }
}

/// Selected when black is absent or formatting is disabled; always asks
/// the caller to fall back.
pub struct NoFormatter;

impl Formatter for NoFormatter {
    fn name(&self) -> &'static str {
        "none"
    }

    fn format(&self, _source: &str) -> Result<String, FileError> {
        Err(FileError::tool_unavailable("black"))
    }
}
