//! Span-based structural rewriting
//!
//! Edits are derived from the parsed tree, never from text search, so a
//! rename can never touch string or comment content. Spans are applied
//! back-to-front and the result must re-parse before it is accepted;
//! otherwise the whole edit set is rejected and the caller keeps the
//! original text.

use crate::errors::FileError;
use crate::parsers::python::{walk_suite, AstVisitor, ImportStatement};
use indexmap::{IndexMap, IndexSet};
use rustpython_parser::ast::{self, Suite};
use rustpython_parser::{parse, Mode};

/// Result of an accepted rewrite.
#[derive(Debug)]
pub struct RewriteOutcome {
    pub text: String,
    /// Subset of the proposals that produced at least one edit
    pub renames_applied: IndexMap<String, String>,
    /// Import names removed from the text, in detection order
    pub imports_removed: Vec<String>,
}

/// Structural-rewrite capability.
///
/// `Ok(None)` means the capability is absent and proposals should surface
/// as suggestions only.
pub trait RewriteEngine: Send + Sync {
    fn apply(
        &self,
        source: &str,
        suite: &Suite,
        imports: &[ImportStatement],
        renames: &IndexMap<String, String>,
        unused: &IndexSet<String>,
    ) -> Result<Option<RewriteOutcome>, FileError>;
}

/// Selected when fix mode is off: never edits anything.
pub struct NoopRewriter;

impl RewriteEngine for NoopRewriter {
    fn apply(
        &self,
        _source: &str,
        _suite: &Suite,
        _imports: &[ImportStatement],
        _renames: &IndexMap<String, String>,
        _unused: &IndexSet<String>,
    ) -> Result<Option<RewriteOutcome>, FileError> {
        Ok(None)
    }
}

/// In-process rewriter working on byte spans from the syntax tree.
pub struct SpanRewriter;

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
    /// Text the span must currently hold. Arithmetic-derived spans carry
    /// their token here and are skipped on mismatch; parser-exact spans
    /// pass `None`.
    expected: Option<String>,
    /// From-name to mark applied when this edit lands
    rename_from: Option<String>,
}

impl RewriteEngine for SpanRewriter {
    fn apply(
        &self,
        source: &str,
        suite: &Suite,
        imports: &[ImportStatement],
        renames: &IndexMap<String, String>,
        unused: &IndexSet<String>,
    ) -> Result<Option<RewriteOutcome>, FileError> {
        let mut collector = RenameSpans {
            renames,
            edits: Vec::new(),
        };
        walk_suite(&mut collector, suite);
        let mut edits = collector.edits;

        let (removal_edits, imports_removed) = import_removal_edits(source, imports, unused);
        edits.extend(removal_edits);

        if edits.is_empty() {
            return Ok(Some(RewriteOutcome {
                text: source.to_string(),
                renames_applied: IndexMap::new(),
                imports_removed: Vec::new(),
            }));
        }

        let (text, applied_froms) = apply_edits(source, edits);
        parse(&text, Mode::Module, "<rewrite>")
            .map_err(|e| FileError::RewriteVerification(e.to_string()))?;

        let renames_applied = renames
            .iter()
            .filter(|(from, _)| applied_froms.contains(from.as_str()))
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        Ok(Some(RewriteOutcome {
            text,
            renames_applied,
            imports_removed,
        }))
    }
}

/// Collects rename spans for the three identifier positions: plain names,
/// attribute members, and parameter names.
struct RenameSpans<'a> {
    renames: &'a IndexMap<String, String>,
    edits: Vec<Edit>,
}

impl AstVisitor for RenameSpans<'_> {
    fn visit_name(&mut self, name: &ast::ExprName) {
        if let Some(to) = self.renames.get(name.id.as_str()) {
            let start: usize = name.range.start().into();
            let end: usize = name.range.end().into();
            self.edits.push(Edit {
                start,
                end,
                replacement: to.clone(),
                expected: Some(name.id.to_string()),
                rename_from: Some(name.id.to_string()),
            });
        }
    }

    fn visit_attribute(&mut self, attr: &ast::ExprAttribute) {
        if let Some(to) = self.renames.get(attr.attr.as_str()) {
            // The member token occupies the tail of the attribute range.
            let end: usize = attr.range.end().into();
            let token_len = attr.attr.as_str().len();
            if end >= token_len {
                self.edits.push(Edit {
                    start: end - token_len,
                    end,
                    replacement: to.clone(),
                    expected: Some(attr.attr.to_string()),
                    rename_from: Some(attr.attr.to_string()),
                });
            }
        }
    }

    fn visit_arg(&mut self, arg: &ast::Arg) {
        if let Some(to) = self.renames.get(arg.arg.as_str()) {
            // The parameter range starts at its name and may continue into
            // an annotation.
            let start: usize = arg.range.start().into();
            self.edits.push(Edit {
                start,
                end: start + arg.arg.as_str().len(),
                replacement: to.clone(),
                expected: Some(arg.arg.to_string()),
                rename_from: Some(arg.arg.to_string()),
            });
        }
    }
}

/// Build deletion edits for unused imports: the whole statement when every
/// bound name is unused, otherwise only the unused aliases.
fn import_removal_edits(
    source: &str,
    imports: &[ImportStatement],
    unused: &IndexSet<String>,
) -> (Vec<Edit>, Vec<String>) {
    let mut edits = Vec::new();
    let mut removed: IndexSet<String> = IndexSet::new();

    for statement in imports {
        let removable: Vec<bool> = statement
            .names
            .iter()
            .map(|n| n.bound.as_deref().is_some_and(|b| unused.contains(b)))
            .collect();
        if !removable.iter().any(|&r| r) {
            continue;
        }

        if removable.iter().all(|&r| r) {
            let (start, end) = whole_line_span(source, statement.span);
            edits.push(Edit {
                start,
                end,
                replacement: String::new(),
                expected: None,
                rename_from: None,
            });
        } else {
            // Delete each maximal run of unused aliases together with the
            // separating comma on one side.
            let mut i = 0;
            while i < statement.names.len() {
                if !removable[i] {
                    i += 1;
                    continue;
                }
                let run_start = i;
                while i < statement.names.len() && removable[i] {
                    i += 1;
                }
                let (start, end) = if i < statement.names.len() {
                    (statement.names[run_start].span.0, statement.names[i].span.0)
                } else {
                    (
                        statement.names[run_start - 1].span.1,
                        statement.names[i - 1].span.1,
                    )
                };
                edits.push(Edit {
                    start,
                    end,
                    replacement: String::new(),
                    expected: None,
                    rename_from: None,
                });
            }
        }

        for (name, flagged) in statement.names.iter().zip(&removable) {
            if *flagged {
                if let Some(bound) = &name.bound {
                    removed.insert(bound.clone());
                }
            }
        }
    }

    (edits, removed.into_iter().collect())
}

/// Extend a statement span to cover its whole line, terminator included,
/// when nothing but whitespace shares the line. A trailing comment keeps
/// the deletion narrowed to the statement itself.
fn whole_line_span(source: &str, span: (usize, usize)) -> (usize, usize) {
    let (start, end) = span;
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let leading_blank = source[line_start..start]
        .chars()
        .all(|c| c == ' ' || c == '\t');

    let after = &source[end..];
    let trimmed = after.trim_start_matches(|c| c == ' ' || c == '\t');
    let ws_len = after.len() - trimmed.len();
    let trailing = if trimmed.starts_with("\r\n") {
        Some(ws_len + 2)
    } else if trimmed.starts_with('\n') {
        Some(ws_len + 1)
    } else if trimmed.is_empty() {
        Some(ws_len)
    } else {
        None
    };

    match (leading_blank, trailing) {
        (true, Some(extra)) => (line_start, end + extra),
        _ => (start, end),
    }
}

/// Apply edits back-to-front so earlier offsets stay valid. Edits whose
/// expected text no longer matches are skipped.
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> (String, IndexSet<String>) {
    edits.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut text = source.to_string();
    let mut applied_froms = IndexSet::new();
    for edit in edits.iter().rev() {
        let current = match text.get(edit.start..edit.end) {
            Some(s) => s,
            None => continue,
        };
        if let Some(expected) = &edit.expected {
            if current != expected {
                continue;
            }
        }
        text.replace_range(edit.start..edit.end, &edit.replacement);
        if let Some(from) = &edit.rename_from {
            applied_froms.insert(from.clone());
        }
    }
    (text, applied_froms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::python::{index_module, parse_module};

    fn rewrite(
        source: &str,
        renames: &[(&str, &str)],
        unused: &[&str],
    ) -> Result<Option<RewriteOutcome>, FileError> {
        let suite = parse_module(source, "test.py").expect("should parse test source");
        let index = index_module(&suite, source);
        let renames: IndexMap<String, String> = renames
            .iter()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect();
        let unused: IndexSet<String> = unused.iter().map(|s| s.to_string()).collect();
        SpanRewriter.apply(source, &suite, &index.imports, &renames, &unused)
    }

    #[test]
    fn test_renames_plain_names() {
        let source = "recieve = 1\nprint(recieve)\n";
        let outcome = rewrite(source, &[("recieve", "receive")], &[])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "receive = 1\nprint(receive)\n");
        assert_eq!(
            outcome.renames_applied.get("recieve").map(String::as_str),
            Some("receive")
        );
    }

    #[test]
    fn test_renames_attribute_members_and_parameters() {
        let source = "def f(lenght):\n    return self.lenght + lenght\n";
        let outcome = rewrite(source, &[("lenght", "length")], &[])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(
            outcome.text,
            "def f(length):\n    return self.length + length\n"
        );
    }

    #[test]
    fn test_strings_and_comments_untouched() {
        let source = "recieve = 1  # recieve\nmsg = \"recieve\"\nprint(recieve)\n";
        let outcome = rewrite(source, &[("recieve", "receive")], &[])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(
            outcome.text,
            "receive = 1  # recieve\nmsg = \"recieve\"\nprint(receive)\n"
        );
    }

    #[test]
    fn test_annotated_parameter_rename() {
        let source = "def f(lenght: int = 0):\n    return lenght\n";
        let outcome = rewrite(source, &[("lenght", "length")], &[])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "def f(length: int = 0):\n    return length\n");
    }

    #[test]
    fn test_fully_unused_import_line_removed() {
        let source = "import os\nimport sys\n\nprint(os.getcwd())\n";
        let outcome = rewrite(source, &[], &["sys"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "import os\n\nprint(os.getcwd())\n");
        assert_eq!(outcome.imports_removed, vec!["sys"]);
    }

    #[test]
    fn test_partially_unused_import_narrowed() {
        let source = "from json import dumps, loads\n\ndumps({})\n";
        let outcome = rewrite(source, &[], &["loads"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "from json import dumps\n\ndumps({})\n");
        assert_eq!(outcome.imports_removed, vec!["loads"]);
    }

    #[test]
    fn test_leading_alias_narrowed() {
        let source = "from json import loads, dumps\n\ndumps({})\n";
        let outcome = rewrite(source, &[], &["loads"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "from json import dumps\n\ndumps({})\n");
    }

    #[test]
    fn test_multiple_aliases_in_one_statement() {
        let source = "import os, sys, json\n\nprint(json.dumps(os.environ))\n";
        let outcome = rewrite(source, &[], &["sys"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "import os, json\n\nprint(json.dumps(os.environ))\n");
    }

    #[test]
    fn test_import_with_trailing_comment_keeps_comment_line() {
        let source = "import sys  # tooling hook\nx = 1\n";
        let outcome = rewrite(source, &[], &["sys"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "  # tooling hook\nx = 1\n");
    }

    #[test]
    fn test_rename_and_removal_in_one_pass() {
        let source = "import sys\n\nvalu = 1\nprint(valu)\n";
        let outcome = rewrite(source, &[("valu", "value")], &["sys"])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, "\nvalue = 1\nprint(value)\n");
        assert_eq!(outcome.imports_removed, vec!["sys"]);
    }

    #[test]
    fn test_no_edits_returns_source_unchanged() {
        let source = "x = 1\n";
        let outcome = rewrite(source, &[], &[])
            .expect("rewrite should succeed")
            .expect("span rewriter is present");
        assert_eq!(outcome.text, source);
        assert!(outcome.renames_applied.is_empty());
        assert!(outcome.imports_removed.is_empty());
    }

    #[test]
    fn test_unparsable_result_is_rejected() {
        // A rename onto a keyword cannot re-parse; the edit set must be
        // rejected as a unit rather than partially applied.
        let source = "valu = 1\nprint(valu)\n";
        let result = rewrite(source, &[("valu", "class")], &[]);
        assert!(matches!(result, Err(FileError::RewriteVerification(_))));
    }

    #[test]
    fn test_noop_rewriter_reports_absent() {
        let source = "import sys\nx = 1\n";
        let suite = parse_module(source, "test.py").expect("should parse test source");
        let index = index_module(&suite, source);
        let renames = IndexMap::new();
        let unused: IndexSet<String> = ["sys".to_string()].into_iter().collect();
        let outcome = NoopRewriter
            .apply(source, &suite, &index.imports, &renames, &unused)
            .expect("noop rewrite should succeed");
        assert!(outcome.is_none());
    }
}
