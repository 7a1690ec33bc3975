//! Vulnerability-scanner capability backed by pip-audit

use super::runner::run_external_tool;
use super::Scanner;
use crate::errors::FileError;

const NOT_INSTALLED: &str =
    "pip-audit not installed; install 'pip-audit' to run vulnerability scans.";
const NO_FINDINGS: &str = "No vulnerable packages found.";

/// Runs `pip-audit --format text` once per invocation. The scan covers
/// the installed environment, so there is nothing per-file about it.
pub struct PipAuditScanner {
    timeout_secs: u64,
}

impl PipAuditScanner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Scanner for PipAuditScanner {
    fn name(&self) -> &'static str {
        "pip-audit"
    }

    fn scan(&self) -> Vec<String> {
        let cmd = vec![
            "pip-audit".to_string(),
            "--format".to_string(),
            "text".to_string(),
        ];
        match run_external_tool(&cmd, "pip-audit", self.timeout_secs, None) {
            Ok(result) if result.timed_out => {
                vec![format!("pip-audit timed out after {}s", self.timeout_secs)]
            }
            Ok(result) if result.return_code == Some(0) => {
                let lines: Vec<String> = result.stdout.lines().map(String::from).collect();
                if lines.is_empty() {
                    vec![NO_FINDINGS.to_string()]
                } else {
                    lines
                }
            }
            // Nonzero exit usually means findings; surface everything.
            Ok(result) => result
                .stdout
                .lines()
                .chain(result.stderr.lines())
                .map(String::from)
                .collect(),
            Err(FileError::ToolUnavailable { .. }) => vec![NOT_INSTALLED.to_string()],
            Err(e) => vec![format!("pip-audit run failed: {}", e)],
        }
    }
}

/// Selected when pip-audit is absent or scanning is disabled.
pub struct NoScanner;

impl Scanner for NoScanner {
    fn name(&self) -> &'static str {
        "none"
    }

    fn scan(&self) -> Vec<String> {
        vec![NOT_INSTALLED.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scanner_reports_absence() {
        let lines = NoScanner.scan();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("pip-audit not installed"));
    }
}
