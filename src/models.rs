//! Core data models for pytidy
//!
//! These models are shared across the pipeline, detectors, and reporters:
//! per-file diagnostics, rename proposals, and the aggregated run report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What a diagnostic is about. Closed set; reporters match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    TrailingWhitespace,
    MixedIndentation,
    InconsistentIndentWidth,
    ParseError,
    RenameApplied,
    RenameSuggested,
    ImportRemoved,
    #[default]
    Other,
}

/// A single observation about one file.
///
/// Diagnostics are immutable once created and kept in emission order,
/// never sorted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// 1-based line number where applicable
    #[serde(default)]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Info,
            message: message.into(),
            line: None,
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            line: None,
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Per-file analysis result
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileReport {
    #[serde(default)]
    pub path: PathBuf,
    /// Whether formatting (external or fallback) changed the text
    #[serde(default)]
    pub formatted: bool,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// from-name -> to-name, in proposal order
    #[serde(default)]
    pub renames_suggested: IndexMap<String, String>,
    /// Subset of `renames_suggested` actually written back
    #[serde(default)]
    pub renames_applied: IndexMap<String, String>,
    #[serde(default)]
    pub unused_imports: Vec<String>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

/// Run-level counters shown in the report footer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub files: usize,
    pub suggested_renames: usize,
    pub warnings: usize,
    pub fixes_applied: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files: reports.len(),
            ..Default::default()
        };
        for report in reports {
            summary.suggested_renames += report.renames_suggested.len();
            summary.fixes_applied += report.renames_applied.len();
            summary.warnings += report.warning_count();
            summary.errors += report.error_count();
        }
        summary
    }
}

/// The full result of one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub files_processed: usize,
    /// Sorted by path regardless of processing order
    pub files: Vec<FileReport>,
    pub deps_found: Vec<String>,
    #[serde(default)]
    pub security_findings: Vec<String>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(
        mut files: Vec<FileReport>,
        deps_found: Vec<String>,
        security_findings: Vec<String>,
    ) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let summary = RunSummary::from_reports(&files);
        Self {
            files_processed: files.len(),
            files,
            deps_found,
            security_findings,
            summary,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.summary.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).expect("serialize severity");
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_diagnostic_kind_snake_case() {
        let json =
            serde_json::to_string(&DiagnosticKind::TrailingWhitespace).expect("serialize kind");
        assert_eq!(json, "\"trailing_whitespace\"");
    }

    #[test]
    fn test_summary_counts() {
        let mut a = FileReport::new("a.py");
        a.push(Diagnostic::warning(
            DiagnosticKind::MixedIndentation,
            "Mixed tabs and spaces in leading indentation (file-level).",
        ));
        a.renames_suggested
            .insert("respone".to_string(), "response".to_string());
        a.renames_applied
            .insert("respone".to_string(), "response".to_string());

        let mut b = FileReport::new("b.py");
        b.push(Diagnostic::error(DiagnosticKind::ParseError, "bad syntax"));

        let summary = RunSummary::from_reports(&[a, b]);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.suggested_renames, 1);
        assert_eq!(summary.fixes_applied, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_run_report_sorts_by_path() {
        let report = RunReport::new(
            vec![FileReport::new("z.py"), FileReport::new("a.py")],
            vec![],
            vec![],
        );
        assert_eq!(report.files[0].path, PathBuf::from("a.py"));
        assert_eq!(report.files[1].path, PathBuf::from("z.py"));
        assert_eq!(report.files_processed, 2);
    }
}
