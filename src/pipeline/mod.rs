//! Per-file analysis and fix pipeline
//!
//! Orchestrates the full sequence for one file:
//! 1. Whitespace diagnosis on the text as read
//! 2. Formatting (fix mode): the external formatter, or the builtin
//!    normalizer when the formatter is unavailable
//! 3. Parse and index the module
//! 4. Unused-import detection and identifier rename proposals
//! 5. Structural rewrite (fix mode), verified by re-parse
//! 6. Final formatter pass when the rewrite changed the text
//! 7. Write-back, only when fix mode actually changed the text
//!
//! Capabilities are resolved once at startup. The no-op implementations
//! carry the degraded behavior, so the stages never branch on tool
//! presence and a missing tool can never abort the batch.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::ProjectConfig;
use crate::detectors::{
    detect_typos, detect_unused_imports, diagnose_whitespace, normalize_source, TypoConfig,
};
use crate::errors::FileError;
use crate::external::{
    is_tool_installed, BlackFormatter, Formatter, NoFormatter, NoScanner, PipAuditScanner, Scanner,
};
use crate::fixes::{NoopRewriter, RewriteEngine, SpanRewriter};
use crate::models::{Diagnostic, DiagnosticKind, FileReport};
use crate::parsers::python::{index_module, parse_module};

/// Full per-file pipeline with its resolved capabilities.
pub struct Pipeline {
    /// Whether changed text is written back to disk
    fix: bool,
    formatter: Box<dyn Formatter>,
    rewriter: Box<dyn RewriteEngine>,
    scanner: Box<dyn Scanner>,
}

impl Pipeline {
    pub fn new(
        fix: bool,
        formatter: Box<dyn Formatter>,
        rewriter: Box<dyn RewriteEngine>,
        scanner: Box<dyn Scanner>,
    ) -> Self {
        Self {
            fix,
            formatter,
            rewriter,
            scanner,
        }
    }

    /// Resolve capabilities against the flags, the project config, and the
    /// tools actually installed on this machine.
    pub fn detect(fix: bool, secure: bool, config: &ProjectConfig) -> Self {
        let formatter: Box<dyn Formatter> =
            if fix && config.external.formatter && is_tool_installed("black") {
                Box::new(BlackFormatter::new(config.external.formatter_timeout_secs))
            } else {
                Box::new(NoFormatter)
            };

        let rewriter: Box<dyn RewriteEngine> = if fix {
            Box::new(SpanRewriter)
        } else {
            Box::new(NoopRewriter)
        };

        let scanner: Box<dyn Scanner> =
            if secure && config.external.scanner && is_tool_installed("pip-audit") {
                Box::new(PipAuditScanner::new(config.external.scanner_timeout_secs))
            } else {
                Box::new(NoScanner)
            };

        debug!(
            "capabilities resolved: formatter={}, scanner={}, fix={}",
            formatter.name(),
            scanner.name(),
            fix
        );
        Self::new(fix, formatter, rewriter, scanner)
    }

    /// Run the dependency vulnerability scan for the whole invocation.
    pub fn scan_dependencies(&self) -> Vec<String> {
        self.scanner.scan()
    }

    /// Process one file end to end. Never returns an error: every failure
    /// lands as a diagnostic on the report and the batch moves on.
    pub fn process_file(&self, path: &Path) -> FileReport {
        let original = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                let mut report = FileReport::new(path);
                report.push(Diagnostic::error(
                    DiagnosticKind::Other,
                    FileError::from(err).to_string(),
                ));
                return report;
            }
        };

        let (mut report, text) = self.process_source(path, &original);

        if self.fix && text != original {
            debug!("writing back {}", path.display());
            if let Err(err) = fs::write(path, &text) {
                report.push(Diagnostic::error(
                    DiagnosticKind::Other,
                    format!("failed to write file: {}", err),
                ));
            }
        }
        report
    }

    fn process_source(&self, path: &Path, original: &str) -> (FileReport, String) {
        let mut report = FileReport::new(path);
        let mut text = original.to_string();

        report.diagnostics.extend(diagnose_whitespace(original));

        if self.fix {
            match self.formatter.format(&text) {
                Ok(formatted) => {
                    if formatted != text {
                        text = formatted;
                        report.formatted = true;
                        report.push(Diagnostic::info(
                            DiagnosticKind::Other,
                            format!("formatted with {}", self.formatter.name()),
                        ));
                    }
                }
                Err(FileError::ToolUnavailable { .. }) => {
                    debug!("formatter unavailable; using the builtin normalizer");
                    let (normalized, diagnostics) = normalize_source(&text);
                    if normalized != text {
                        text = normalized;
                        report.formatted = true;
                    }
                    report.diagnostics.extend(diagnostics);
                }
                Err(err) => {
                    report.push(Diagnostic::info(DiagnosticKind::Other, err.to_string()));
                }
            }
        }

        let label = path.display().to_string();
        let suite = match parse_module(&text, &label) {
            Ok(suite) => suite,
            Err(err) => {
                report.push(Diagnostic::error(
                    DiagnosticKind::ParseError,
                    err.to_string(),
                ));
                return (report, text);
            }
        };

        let index = index_module(&suite, &text);
        let unused = detect_unused_imports(&index);
        report.unused_imports = unused.iter().cloned().collect();

        let proposals = detect_typos(&index.stats.pooled(), &TypoConfig::default());
        report.renames_suggested = proposals.clone();

        let mut rewrote = false;
        if !proposals.is_empty() || !unused.is_empty() {
            match self
                .rewriter
                .apply(&text, &suite, &index.imports, &proposals, &unused)
            {
                Ok(Some(outcome)) => {
                    rewrote = outcome.text != text;
                    text = outcome.text;
                    if !outcome.imports_removed.is_empty() {
                        report.push(Diagnostic::info(
                            DiagnosticKind::ImportRemoved,
                            format!(
                                "removed unused import(s): {}",
                                outcome.imports_removed.join(", ")
                            ),
                        ));
                    }
                    if !outcome.renames_applied.is_empty() {
                        report.push(Diagnostic::info(
                            DiagnosticKind::RenameApplied,
                            format!(
                                "applied {} identifier rename(s)",
                                outcome.renames_applied.len()
                            ),
                        ));
                    }
                    report.renames_applied = outcome.renames_applied;
                }
                Ok(None) => {
                    report.push(Diagnostic::warning(
                        DiagnosticKind::RenameSuggested,
                        "suggested changes not applied; re-run with --fix to apply them",
                    ));
                }
                Err(err) => {
                    report.push(Diagnostic::error(DiagnosticKind::Other, err.to_string()));
                }
            }
        }

        if self.fix && rewrote {
            match self.formatter.format(&text) {
                Ok(formatted) => {
                    if formatted != text {
                        text = formatted;
                        report.formatted = true;
                        report.push(Diagnostic::info(
                            DiagnosticKind::Other,
                            format!("final pass: formatted with {}", self.formatter.name()),
                        ));
                    }
                }
                // Nothing to re-normalize: the rewrite cannot introduce
                // trailing whitespace or tabs.
                Err(FileError::ToolUnavailable { .. }) => {}
                Err(err) => {
                    report.push(Diagnostic::info(DiagnosticKind::Other, err.to_string()));
                }
            }
        }

        (report, text)
    }
}
