//! Project dependency discovery
//!
//! Reads the declared-dependency surface next to the analyzed paths:
//! `requirements.txt` specifiers and `pyproject.toml` (both the poetry
//! table and PEP 621 `project.dependencies`). Absent or unreadable
//! manifests contribute nothing.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Collect declared dependencies for every root implied by the input
/// paths: a directory argument is its own root, a file argument
/// contributes its parent directory. The result is deduplicated and
/// sorted.
pub fn gather_project_deps(paths: &[PathBuf]) -> Vec<String> {
    let mut deps: BTreeSet<String> = BTreeSet::new();
    for path in paths {
        let root = if path.is_dir() {
            path.clone()
        } else {
            match path.parent() {
                Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
                Some(parent) => parent.to_path_buf(),
                None => PathBuf::from("."),
            }
        };
        deps.extend(parse_requirements_txt(&root.join("requirements.txt")));
        deps.extend(parse_pyproject_toml(&root.join("pyproject.toml")));
    }
    deps.into_iter().filter(|d| !d.is_empty()).collect()
}

/// Non-empty, non-comment lines taken verbatim as specifiers. Includes
/// pip directives like `-r other.txt`; the report is descriptive, not a
/// resolver.
fn parse_requirements_txt(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return vec![],
    };

    let mut deps = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        deps.push(line.to_string());
    }

    debug!("Parsed {} specifiers from {:?}", deps.len(), path);
    deps
}

/// Keys of `[tool.poetry.dependencies]` (minus the `python` language
/// constraint) plus the PEP 621 `project.dependencies` entries.
fn parse_pyproject_toml(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return vec![],
    };
    let doc: toml::Value = match content.parse() {
        Ok(d) => d,
        Err(_) => return vec![],
    };

    let mut deps = Vec::new();
    if let Some(table) = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for name in table.keys() {
            if name == "python" {
                continue;
            }
            deps.push(name.clone());
        }
    }
    if let Some(entries) = doc
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        deps.extend(entries.iter().filter_map(|v| v.as_str()).map(String::from));
    }

    debug!("Parsed {} dependencies from {:?}", deps.len(), path);
    deps
}
