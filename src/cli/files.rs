//! Python file discovery
//!
//! Expands the CLI path arguments into the list of files to process.
//! Directory arguments are walked recursively respecting `.gitignore`;
//! explicit file arguments must already carry the `.py` extension.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

const PYTHON_EXTENSION: &str = "py";

/// Expand path arguments into a sorted, deduplicated list of Python files.
pub fn collect_python_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(walk_directory(path));
        } else if path.is_file() && is_python_file(path) {
            files.push(path.clone());
        } else {
            debug!("skipping argument {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Collect all Python files under a directory, respecting .gitignore
fn walk_directory(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_python_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files
}

fn is_python_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(PYTHON_EXTENSION)
}
