//! Whitespace and indentation lint checks
//!
//! Purely observational: runs in both analyze and fix mode and never
//! touches the text. Cleanup happens in the normalizer or the external
//! formatter, not here.

use crate::models::{Diagnostic, DiagnosticKind};
use std::collections::{HashMap, HashSet};

/// Leading run of spaces and tabs on one physical line.
fn leading_whitespace(line: &str) -> &str {
    let rest = line.trim_start_matches(|c| c == ' ' || c == '\t');
    &line[..line.len() - rest.len()]
}

/// Scan raw lines for trailing whitespace, tab/space mixing, and
/// inconsistent indentation widths.
///
/// Trailing whitespace is reported per line. Mixed indentation and
/// inconsistent widths are file-level findings reported at most once,
/// computed over the set of distinct indent prefixes rather than per line
/// so heavily-indented files do not drown the report.
pub fn diagnose_whitespace(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut prefixes: HashSet<&str> = HashSet::new();

    for (idx, line) in source.lines().enumerate() {
        if line.len() != line.trim_end().len() {
            diagnostics.push(
                Diagnostic::warning(DiagnosticKind::TrailingWhitespace, "trailing whitespace")
                    .with_line(idx + 1),
            );
        }
        let prefix = leading_whitespace(line);
        if !prefix.is_empty() {
            prefixes.insert(prefix);
        }
    }

    let has_tabs = prefixes.iter().any(|p| p.contains('\t'));
    let has_spaces = prefixes.iter().any(|p| p.contains(' '));
    if has_tabs && has_spaces {
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::MixedIndentation,
            "mixed tabs and spaces in leading indentation",
        ));
    }

    // Width = space count per distinct prefix. More than two distinct
    // widths suggests the file never settled on an indent step.
    let mut width_counts: HashMap<usize, usize> = HashMap::new();
    for prefix in &prefixes {
        let spaces = prefix.chars().filter(|&c| c == ' ').count();
        if spaces > 0 {
            *width_counts.entry(spaces).or_insert(0) += 1;
        }
    }
    if width_counts.len() > 2 {
        let common = width_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(width, _)| *width)
            .unwrap_or(0);
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::InconsistentIndentWidth,
            format!("inconsistent indentation widths (common width {})", common),
        ));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_clean_file_yields_nothing() {
        let source = "def f():\n    return 1\n";
        assert!(diagnose_whitespace(source).is_empty());
    }

    #[test]
    fn test_trailing_whitespace_per_line() {
        let source = "x = 1   \ny = 2\nz = 3\t\n";
        let diagnostics = diagnose_whitespace(source);
        assert_eq!(
            kinds(&diagnostics),
            vec![
                DiagnosticKind::TrailingWhitespace,
                DiagnosticKind::TrailingWhitespace
            ]
        );
        assert_eq!(diagnostics[0].line, Some(1));
        assert_eq!(diagnostics[1].line, Some(3));
    }

    #[test]
    fn test_mixed_indentation_reported_once() {
        let source = "def f():\n\tx = 1\n\ty = 2\n    z = 3\n";
        let diagnostics = diagnose_whitespace(source);
        let mixed: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MixedIndentation)
            .collect();
        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].line, None);
    }

    #[test]
    fn test_tabs_only_is_not_mixed() {
        let source = "def f():\n\tx = 1\n";
        let diagnostics = diagnose_whitespace(source);
        assert!(!kinds(&diagnostics).contains(&DiagnosticKind::MixedIndentation));
    }

    #[test]
    fn test_inconsistent_widths_needs_more_than_two() {
        // Two distinct widths: fine.
        let two = "if a:\n    b\nif c:\n        d\n";
        assert!(!kinds(&diagnose_whitespace(two)).contains(&DiagnosticKind::InconsistentIndentWidth));

        // Three distinct widths: flagged, naming the most frequent. Width 4
        // occurs in two distinct prefixes ("    " and "\t    ").
        let three = "if a:\n   b\nif c:\n    d\nif e:\n      f\nif g:\n\t    h\n";
        let diagnostics = diagnose_whitespace(three);
        let found = diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::InconsistentIndentWidth)
            .expect("should flag three widths");
        assert!(found.message.contains("common width 4"));
    }

    #[test]
    fn test_width_tie_prefers_smaller() {
        // Widths 2, 4, 6 each appear in one distinct prefix.
        let source = "if a:\n  b\nif c:\n    d\nif e:\n      f\n";
        let diagnostics = diagnose_whitespace(source);
        let found = diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::InconsistentIndentWidth)
            .expect("should flag three widths");
        assert!(found.message.contains("common width 2"));
    }
}
