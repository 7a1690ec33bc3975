//! Python parsing and syntax-tree walking
//!
//! Wraps rustpython-parser and provides the single AST traversal the rest of
//! the pipeline hooks into: identifier frequency collection, import binding
//! extraction, and (via the same visitor seam) rename span gathering in the
//! rewrite engine. The tree is a closed set of enum variants, so every
//! consumer is an exhaustive match rather than a reflective walk.

use crate::errors::FileError;
use line_numbers::LinePositions;
use rustpython_parser::ast::{self, Expr, Stmt, Suite};
use rustpython_parser::{parse, Mode};
use std::collections::HashMap;

/// Parse a module, returning its statement list.
///
/// The parser error is surfaced through its display form, which already
/// carries row/column information.
pub fn parse_module(source: &str, path_label: &str) -> Result<Suite, FileError> {
    let module =
        parse(source, Mode::Module, path_label).map_err(|e| FileError::Parse(e.to_string()))?;
    match module {
        ast::Mod::Module(m) => Ok(m.body),
        _ => Err(FileError::Parse(
            "expected a module-level parse".to_string(),
        )),
    }
}

/// Occurrence counts for identifiers in one file, split by namespace.
#[derive(Debug, Default, Clone)]
pub struct IdentifierStats {
    /// Bare identifier occurrences, including assignment targets
    pub plain: HashMap<String, usize>,
    /// Right-hand member names of attribute accesses
    pub attrs: HashMap<String, usize>,
}

impl IdentifierStats {
    /// Combined table used by the typo detector: plain + attribute counts.
    pub fn pooled(&self) -> HashMap<String, usize> {
        let mut pooled = self.plain.clone();
        for (name, count) in &self.attrs {
            *pooled.entry(name.clone()).or_insert(0) += count;
        }
        pooled
    }
}

/// One name introduced by an import statement.
#[derive(Debug, Clone)]
pub struct ImportedName {
    /// Locally-bound name: the alias if present, otherwise the first dotted
    /// segment (`import a.b` binds `a`) or the member name itself
    /// (`from m import x` binds `x`). `None` for wildcard members.
    pub bound: Option<String>,
    /// Byte span of the alias node (`name` or `name as alias`)
    pub span: (usize, usize),
}

/// An `import` or `from ... import` statement with its source positions.
#[derive(Debug, Clone)]
pub struct ImportStatement {
    /// Byte span of the whole statement, terminator excluded
    pub span: (usize, usize),
    /// 1-based line of the statement start
    pub line: usize,
    /// Imported names in source order
    pub names: Vec<ImportedName>,
}

impl ImportStatement {
    /// Bound names introduced by this statement (wildcards excluded).
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|n| n.bound.as_deref())
    }
}

/// Everything one traversal of the tree yields for the analysis stages.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    pub stats: IdentifierStats,
    pub imports: Vec<ImportStatement>,
}

/// Collect identifier statistics and import bindings in a single walk.
pub fn index_module(suite: &Suite, source: &str) -> ModuleIndex {
    let mut collector = IndexCollector {
        index: ModuleIndex::default(),
        positions: LinePositions::from(source),
    };
    walk_suite(&mut collector, suite);
    collector.index
}

struct IndexCollector {
    index: ModuleIndex,
    positions: LinePositions,
}

impl IndexCollector {
    fn line_of(&self, offset: usize) -> usize {
        self.positions.from_offset(offset).as_usize() + 1
    }
}

impl AstVisitor for IndexCollector {
    fn visit_name(&mut self, name: &ast::ExprName) {
        *self
            .index
            .stats
            .plain
            .entry(name.id.to_string())
            .or_insert(0) += 1;
    }

    fn visit_attribute(&mut self, attr: &ast::ExprAttribute) {
        *self
            .index
            .stats
            .attrs
            .entry(attr.attr.to_string())
            .or_insert(0) += 1;
    }

    fn visit_import(&mut self, import: &ast::StmtImport) {
        let names = import
            .names
            .iter()
            .map(|alias| ImportedName {
                bound: Some(alias.asname.as_ref().map(|n| n.to_string()).unwrap_or_else(
                    || {
                        alias
                            .name
                            .as_str()
                            .split('.')
                            .next()
                            .unwrap_or("")
                            .to_string()
                    },
                )),
                span: (alias.range.start().into(), alias.range.end().into()),
            })
            .collect();
        let start: usize = import.range.start().into();
        self.index.imports.push(ImportStatement {
            span: (start, import.range.end().into()),
            line: self.line_of(start),
            names,
        });
    }

    fn visit_import_from(&mut self, import: &ast::StmtImportFrom) {
        let names = import
            .names
            .iter()
            .map(|alias| ImportedName {
                bound: if alias.name.as_str() == "*" {
                    None
                } else {
                    Some(
                        alias
                            .asname
                            .as_ref()
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| alias.name.to_string()),
                    )
                },
                span: (alias.range.start().into(), alias.range.end().into()),
            })
            .collect();
        let start: usize = import.range.start().into();
        self.index.imports.push(ImportStatement {
            span: (start, import.range.end().into()),
            line: self.line_of(start),
            names,
        });
    }
}

/// Hooks fired during a full tree walk. The walk functions own the
/// traversal; implementations only record what they care about.
pub trait AstVisitor {
    fn visit_name(&mut self, _name: &ast::ExprName) {}
    fn visit_attribute(&mut self, _attr: &ast::ExprAttribute) {}
    fn visit_arg(&mut self, _arg: &ast::Arg) {}
    fn visit_import(&mut self, _import: &ast::StmtImport) {}
    fn visit_import_from(&mut self, _import: &ast::StmtImportFrom) {}
}

pub fn walk_suite<V: AstVisitor>(visitor: &mut V, suite: &Suite) {
    for stmt in suite {
        walk_stmt(visitor, stmt);
    }
}

fn walk_stmt<V: AstVisitor>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::FunctionDef(func) => {
            for dec in &func.decorator_list {
                walk_expr(v, dec);
            }
            walk_arguments(v, &func.args);
            if let Some(ret) = &func.returns {
                walk_expr(v, ret);
            }
            walk_suite(v, &func.body);
        }
        Stmt::AsyncFunctionDef(func) => {
            for dec in &func.decorator_list {
                walk_expr(v, dec);
            }
            walk_arguments(v, &func.args);
            if let Some(ret) = &func.returns {
                walk_expr(v, ret);
            }
            walk_suite(v, &func.body);
        }
        Stmt::ClassDef(class) => {
            for dec in &class.decorator_list {
                walk_expr(v, dec);
            }
            for base in &class.bases {
                walk_expr(v, base);
            }
            for kw in &class.keywords {
                walk_expr(v, &kw.value);
            }
            walk_suite(v, &class.body);
        }
        Stmt::Return(ret) => {
            if let Some(val) = &ret.value {
                walk_expr(v, val);
            }
        }
        Stmt::Delete(del) => {
            for target in &del.targets {
                walk_expr(v, target);
            }
        }
        Stmt::Assign(assign) => {
            for target in &assign.targets {
                walk_expr(v, target);
            }
            walk_expr(v, &assign.value);
        }
        Stmt::AugAssign(aug) => {
            walk_expr(v, &aug.target);
            walk_expr(v, &aug.value);
        }
        Stmt::AnnAssign(ann) => {
            walk_expr(v, &ann.target);
            walk_expr(v, &ann.annotation);
            if let Some(val) = &ann.value {
                walk_expr(v, val);
            }
        }
        Stmt::For(for_stmt) => {
            walk_expr(v, &for_stmt.target);
            walk_expr(v, &for_stmt.iter);
            walk_suite(v, &for_stmt.body);
            walk_suite(v, &for_stmt.orelse);
        }
        Stmt::AsyncFor(for_stmt) => {
            walk_expr(v, &for_stmt.target);
            walk_expr(v, &for_stmt.iter);
            walk_suite(v, &for_stmt.body);
            walk_suite(v, &for_stmt.orelse);
        }
        Stmt::While(while_stmt) => {
            walk_expr(v, &while_stmt.test);
            walk_suite(v, &while_stmt.body);
            walk_suite(v, &while_stmt.orelse);
        }
        Stmt::If(if_stmt) => {
            walk_expr(v, &if_stmt.test);
            walk_suite(v, &if_stmt.body);
            walk_suite(v, &if_stmt.orelse);
        }
        Stmt::With(with_stmt) => {
            for item in &with_stmt.items {
                walk_expr(v, &item.context_expr);
                if let Some(vars) = &item.optional_vars {
                    walk_expr(v, vars);
                }
            }
            walk_suite(v, &with_stmt.body);
        }
        Stmt::AsyncWith(with_stmt) => {
            for item in &with_stmt.items {
                walk_expr(v, &item.context_expr);
                if let Some(vars) = &item.optional_vars {
                    walk_expr(v, vars);
                }
            }
            walk_suite(v, &with_stmt.body);
        }
        Stmt::Match(match_stmt) => {
            walk_expr(v, &match_stmt.subject);
            for case in &match_stmt.cases {
                walk_pattern(v, &case.pattern);
                if let Some(guard) = &case.guard {
                    walk_expr(v, guard);
                }
                walk_suite(v, &case.body);
            }
        }
        Stmt::Raise(raise) => {
            if let Some(exc) = &raise.exc {
                walk_expr(v, exc);
            }
            if let Some(cause) = &raise.cause {
                walk_expr(v, cause);
            }
        }
        Stmt::Try(try_stmt) => {
            walk_suite(v, &try_stmt.body);
            for handler in &try_stmt.handlers {
                let ast::ExceptHandler::ExceptHandler(h) = handler;
                if let Some(typ) = &h.type_ {
                    walk_expr(v, typ);
                }
                walk_suite(v, &h.body);
            }
            walk_suite(v, &try_stmt.orelse);
            walk_suite(v, &try_stmt.finalbody);
        }
        Stmt::Assert(assert) => {
            walk_expr(v, &assert.test);
            if let Some(msg) = &assert.msg {
                walk_expr(v, msg);
            }
        }
        Stmt::Import(import) => v.visit_import(import),
        Stmt::ImportFrom(import) => v.visit_import_from(import),
        Stmt::Expr(expr_stmt) => walk_expr(v, &expr_stmt.value),
        // Pass/Break/Continue/Global/Nonlocal carry no name expressions
        _ => {}
    }
}

fn walk_expr<V: AstVisitor>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Name(name) => v.visit_name(name),
        Expr::Attribute(attr) => {
            v.visit_attribute(attr);
            walk_expr(v, &attr.value);
        }
        Expr::Call(call) => {
            walk_expr(v, &call.func);
            for arg in &call.args {
                walk_expr(v, arg);
            }
            for keyword in &call.keywords {
                walk_expr(v, &keyword.value);
            }
        }
        Expr::BoolOp(boolop) => {
            for val in &boolop.values {
                walk_expr(v, val);
            }
        }
        Expr::NamedExpr(named) => {
            walk_expr(v, &named.target);
            walk_expr(v, &named.value);
        }
        Expr::BinOp(binop) => {
            walk_expr(v, &binop.left);
            walk_expr(v, &binop.right);
        }
        Expr::UnaryOp(unary) => walk_expr(v, &unary.operand),
        Expr::Lambda(lambda) => {
            walk_arguments(v, &lambda.args);
            walk_expr(v, &lambda.body);
        }
        Expr::IfExp(ifexp) => {
            walk_expr(v, &ifexp.test);
            walk_expr(v, &ifexp.body);
            walk_expr(v, &ifexp.orelse);
        }
        Expr::Dict(dict) => {
            for key in dict.keys.iter().flatten() {
                walk_expr(v, key);
            }
            for val in &dict.values {
                walk_expr(v, val);
            }
        }
        Expr::Set(set) => {
            for elt in &set.elts {
                walk_expr(v, elt);
            }
        }
        Expr::ListComp(comp) => {
            walk_expr(v, &comp.elt);
            walk_comprehensions(v, &comp.generators);
        }
        Expr::SetComp(comp) => {
            walk_expr(v, &comp.elt);
            walk_comprehensions(v, &comp.generators);
        }
        Expr::DictComp(comp) => {
            walk_expr(v, &comp.key);
            walk_expr(v, &comp.value);
            walk_comprehensions(v, &comp.generators);
        }
        Expr::GeneratorExp(gen) => {
            walk_expr(v, &gen.elt);
            walk_comprehensions(v, &gen.generators);
        }
        Expr::Await(await_expr) => walk_expr(v, &await_expr.value),
        Expr::Yield(yield_expr) => {
            if let Some(val) = &yield_expr.value {
                walk_expr(v, val);
            }
        }
        Expr::YieldFrom(yf) => walk_expr(v, &yf.value),
        Expr::Compare(cmp) => {
            walk_expr(v, &cmp.left);
            for comp in &cmp.comparators {
                walk_expr(v, comp);
            }
        }
        Expr::FormattedValue(fv) => {
            walk_expr(v, &fv.value);
            if let Some(format_spec) = &fv.format_spec {
                walk_expr(v, format_spec);
            }
        }
        Expr::JoinedStr(js) => {
            for val in &js.values {
                walk_expr(v, val);
            }
        }
        Expr::Subscript(sub) => {
            walk_expr(v, &sub.value);
            walk_expr(v, &sub.slice);
        }
        Expr::Starred(starred) => walk_expr(v, &starred.value),
        Expr::List(list) => {
            for elt in &list.elts {
                walk_expr(v, elt);
            }
        }
        Expr::Tuple(tuple) => {
            for elt in &tuple.elts {
                walk_expr(v, elt);
            }
        }
        Expr::Slice(slice) => {
            if let Some(lower) = &slice.lower {
                walk_expr(v, lower);
            }
            if let Some(upper) = &slice.upper {
                walk_expr(v, upper);
            }
            if let Some(step) = &slice.step {
                walk_expr(v, step);
            }
        }
        // Constant literals carry no identifiers
        _ => {}
    }
}

fn walk_arguments<V: AstVisitor>(v: &mut V, args: &ast::Arguments) {
    for arg in args
        .posonlyargs
        .iter()
        .chain(&args.args)
        .chain(&args.kwonlyargs)
    {
        v.visit_arg(&arg.def);
        if let Some(annotation) = &arg.def.annotation {
            walk_expr(v, annotation);
        }
        if let Some(default) = &arg.default {
            walk_expr(v, default);
        }
    }
    if let Some(vararg) = &args.vararg {
        v.visit_arg(vararg);
        if let Some(annotation) = &vararg.annotation {
            walk_expr(v, annotation);
        }
    }
    if let Some(kwarg) = &args.kwarg {
        v.visit_arg(kwarg);
        if let Some(annotation) = &kwarg.annotation {
            walk_expr(v, annotation);
        }
    }
}

fn walk_comprehensions<V: AstVisitor>(v: &mut V, generators: &[ast::Comprehension]) {
    for generator in generators {
        walk_expr(v, &generator.target);
        walk_expr(v, &generator.iter);
        for condition in &generator.ifs {
            walk_expr(v, condition);
        }
    }
}

fn walk_pattern<V: AstVisitor>(v: &mut V, pattern: &ast::Pattern) {
    use ast::Pattern;
    match pattern {
        Pattern::MatchValue(value) => walk_expr(v, &value.value),
        Pattern::MatchSequence(seq) => {
            for p in &seq.patterns {
                walk_pattern(v, p);
            }
        }
        Pattern::MatchMapping(mapping) => {
            for key in &mapping.keys {
                walk_expr(v, key);
            }
            for p in &mapping.patterns {
                walk_pattern(v, p);
            }
        }
        Pattern::MatchClass(class) => {
            walk_expr(v, &class.cls);
            for p in &class.patterns {
                walk_pattern(v, p);
            }
            for p in &class.kwd_patterns {
                walk_pattern(v, p);
            }
        }
        Pattern::MatchAs(as_pattern) => {
            if let Some(p) = &as_pattern.pattern {
                walk_pattern(v, p);
            }
        }
        Pattern::MatchOr(or_pattern) => {
            for p in &or_pattern.patterns {
                walk_pattern(v, p);
            }
        }
        // MatchSingleton / MatchStar bind via raw identifiers, not names
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(source: &str) -> ModuleIndex {
        let suite = parse_module(source, "test.py").expect("should parse test source");
        index_module(&suite, source)
    }

    #[test]
    fn test_parse_error_reported() {
        let err = parse_module("def broken(:\n", "test.py").expect_err("should fail to parse");
        assert!(matches!(err, FileError::Parse(_)));
    }

    #[test]
    fn test_plain_name_counts() {
        let source = r#"
value = 1
value = value + other
print(value)
"#;
        let idx = index(source);
        assert_eq!(idx.stats.plain.get("value"), Some(&4));
        assert_eq!(idx.stats.plain.get("other"), Some(&1));
        assert_eq!(idx.stats.plain.get("print"), Some(&1));
    }

    #[test]
    fn test_attribute_names_separate_namespace() {
        let source = r#"
import os
path = os.path.join(os.getcwd(), "x")
"#;
        let idx = index(source);
        assert_eq!(idx.stats.plain.get("os"), Some(&2));
        assert_eq!(idx.stats.attrs.get("path"), Some(&1));
        assert_eq!(idx.stats.attrs.get("join"), Some(&1));
        assert_eq!(idx.stats.attrs.get("getcwd"), Some(&1));
        // "path" as an assignment target is a plain name
        assert_eq!(idx.stats.plain.get("path"), Some(&1));
    }

    #[test]
    fn test_pooled_counts_sum_namespaces() {
        let source = r#"
result = obj.result
result = obj.result
"#;
        let idx = index(source);
        let pooled = idx.stats.pooled();
        // 2 plain targets + 2 attribute members
        assert_eq!(pooled.get("result"), Some(&4));
    }

    #[test]
    fn test_import_bindings() {
        let source = r#"
import os.path
import numpy as np
from collections import OrderedDict, defaultdict as dd
from os import *
"#;
        let idx = index(source);
        assert_eq!(idx.imports.len(), 4);

        let bound: Vec<Vec<Option<&str>>> = idx
            .imports
            .iter()
            .map(|s| s.names.iter().map(|n| n.bound.as_deref()).collect())
            .collect();
        assert_eq!(bound[0], vec![Some("os")]);
        assert_eq!(bound[1], vec![Some("np")]);
        assert_eq!(bound[2], vec![Some("OrderedDict"), Some("dd")]);
        assert_eq!(bound[3], vec![None]);

        assert_eq!(idx.imports[0].line, 2);
        assert_eq!(idx.imports[1].line, 3);
    }

    #[test]
    fn test_import_spans_cover_statement() {
        let source = "import os, sys\n";
        let idx = index(source);
        let stmt = &idx.imports[0];
        assert_eq!(&source[stmt.span.0..stmt.span.1], "import os, sys");
        assert_eq!(&source[stmt.names[0].span.0..stmt.names[0].span.1], "os");
        assert_eq!(&source[stmt.names[1].span.0..stmt.names[1].span.1], "sys");
    }

    #[test]
    fn test_names_collected_in_nested_scopes() {
        let source = r#"
def outer(param):
    def inner():
        return param + closure

    values = [item for item in param if item]
    with open("f") as handle:
        handle.read()
    return inner
"#;
        let idx = index(source);
        assert!(idx.stats.plain.contains_key("param"));
        assert!(idx.stats.plain.contains_key("closure"));
        assert!(idx.stats.plain.contains_key("item"));
        assert!(idx.stats.plain.contains_key("handle"));
        assert_eq!(idx.stats.attrs.get("read"), Some(&1));
    }

    #[test]
    fn test_fstring_names_counted() {
        let source = r#"
name = "x"
greeting = f"hello {name}"
"#;
        let idx = index(source);
        assert_eq!(idx.stats.plain.get("name"), Some(&2));
    }

    #[test]
    fn test_parameters_not_counted_as_plain_names() {
        let source = r#"
def handler(request):
    pass
"#;
        let idx = index(source);
        assert!(!idx.stats.plain.contains_key("request"));
        assert!(!idx.stats.plain.contains_key("handler"));
    }
}
