//! Text (terminal) reporter with colors

use crate::models::{Diagnostic, RunReport, Severity};
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";

/// Longest dependency list worth printing in full
const MAX_DEPS_LISTED: usize = 50;

/// Severity colors
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",   // Red
        Severity::Warning => "\x1b[33m", // Yellow
        Severity::Info => "\x1b[90m",    // Gray
    }
}

/// Severity tag
fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[E]",
        Severity::Warning => "[W]",
        Severity::Info => "•",
    }
}

fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    let location = match diagnostic.line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    };
    format!(
        "  {}{}{RESET} {}{}",
        severity_color(diagnostic.severity),
        severity_tag(diagnostic.severity),
        location,
        diagnostic.message
    )
}

/// Render the run report as formatted terminal output
pub fn render(report: &RunReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!(
        "{BOLD}pytidy{RESET}: {} file(s) processed\n\n",
        report.files_processed
    ));

    for file in &report.files {
        out.push_str(&format!("{BOLD}{}{RESET}\n", file.path.display()));
        if file.formatted {
            out.push_str(&format!("  {GREEN}✓{RESET} formatted code\n"));
        }
        for diagnostic in &file.diagnostics {
            out.push_str(&diagnostic_line(diagnostic));
            out.push('\n');
        }
        if !file.renames_suggested.is_empty() {
            out.push_str(&format!(
                "  suggested renames ({}):\n",
                file.renames_suggested.len()
            ));
            for (from, to) in &file.renames_suggested {
                let applied = if file.renames_applied.get(from) == Some(to) {
                    format!(" {DIM}(applied){RESET}")
                } else {
                    String::new()
                };
                out.push_str(&format!("    - {} -> {}{}\n", from, to, applied));
            }
        }
        if !file.unused_imports.is_empty() {
            out.push_str(&format!(
                "  unused imports: {}\n",
                file.unused_imports.join(", ")
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("{BOLD}DEPENDENCIES{RESET}\n"));
    if report.deps_found.is_empty() {
        out.push_str("  (no requirements.txt or pyproject.toml deps detected)\n");
    } else {
        for dep in report.deps_found.iter().take(MAX_DEPS_LISTED) {
            out.push_str(&format!("  - {}\n", dep));
        }
        let remaining = report.deps_found.len().saturating_sub(MAX_DEPS_LISTED);
        if remaining > 0 {
            out.push_str(&format!("  {DIM}...and {} more{RESET}\n", remaining));
        }
    }

    if !report.security_findings.is_empty() {
        out.push_str(&format!("\n{BOLD}SECURITY{RESET}\n"));
        for line in &report.security_findings {
            out.push_str(&format!("  {}\n", line));
        }
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\nSummary: files={}, suggested renames={}, warnings={}, fixes applied={}, errors={}\n",
        summary.files,
        summary.suggested_renames,
        summary.warnings,
        summary.fixes_applied,
        summary.errors
    ));

    Ok(out)
}
