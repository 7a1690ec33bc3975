//! Fallback whitespace normalizer
//!
//! Used in fix mode when the external formatter is unavailable or
//! disabled. Strictly line-local: strips trailing whitespace and expands
//! leading tabs to 4 spaces. Never reflows or reindents code relative to
//! block structure.

use crate::models::{Diagnostic, DiagnosticKind};

const TAB_WIDTH: usize = 4;

/// Normalize trailing whitespace and leading tabs.
///
/// Returns the rewritten text and one Info diagnostic per changed line.
/// Line endings follow the input convention (CRLF files stay CRLF) and a
/// single trailing terminator is preserved iff the input ended with one.
/// Running the result through again changes nothing.
pub fn normalize_source(source: &str) -> (String, Vec<Diagnostic>) {
    let eol = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let had_terminator = source.ends_with('\n');

    let mut diagnostics = Vec::new();
    let mut lines = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let mut current = line.trim_end().to_string();
        if current.len() != line.len() {
            diagnostics.push(
                Diagnostic::info(DiagnosticKind::TrailingWhitespace, "trailing whitespace removed")
                    .with_line(line_no),
            );
        }

        let rest = current.trim_start_matches(|c| c == ' ' || c == '\t');
        let prefix = current.len() - rest.len();
        if current[..prefix].contains('\t') {
            let expanded: String = current[..prefix]
                .chars()
                .map(|c| {
                    if c == '\t' {
                        " ".repeat(TAB_WIDTH)
                    } else {
                        c.to_string()
                    }
                })
                .collect();
            current = format!("{}{}", expanded, &current[prefix..]);
            diagnostics.push(
                Diagnostic::info(
                    DiagnosticKind::MixedIndentation,
                    "converted leading tabs to spaces",
                )
                .with_line(line_no),
            );
        }
        lines.push(current);
    }

    let mut text = lines.join(eol);
    if had_terminator {
        text.push_str(eol);
    }
    (text, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_whitespace() {
        let (text, diagnostics) = normalize_source("x = 1   \ny = 2\n");
        assert_eq!(text, "x = 1\ny = 2\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, Some(1));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::TrailingWhitespace);
    }

    #[test]
    fn test_expands_leading_tabs_only() {
        let (text, diagnostics) = normalize_source("def f():\n\tx = \"a\tb\"\n");
        assert_eq!(text, "def f():\n    x = \"a\tb\"\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_expands_every_tab_in_prefix() {
        let (text, _) = normalize_source("\t\tx = 1\n \ty = 2\n");
        assert_eq!(text, "        x = 1\n     y = 2\n");
    }

    #[test]
    fn test_idempotent() {
        let (once, _) = normalize_source("\tx = 1  \ny = 2\t\n");
        let (twice, diagnostics) = normalize_source(&once);
        assert_eq!(once, twice);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_preserves_crlf_and_missing_terminator() {
        let (text, _) = normalize_source("x = 1  \r\ny = 2");
        assert_eq!(text, "x = 1\r\ny = 2");
    }

    #[test]
    fn test_clean_input_unchanged() {
        let source = "def f():\n    return 1\n";
        let (text, diagnostics) = normalize_source(source);
        assert_eq!(text, source);
        assert!(diagnostics.is_empty());
    }
}
