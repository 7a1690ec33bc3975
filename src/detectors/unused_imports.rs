//! Unused-import detection
//!
//! An imported binding is unused when its locally-bound name never occurs
//! as a plain-name reference anywhere in the tree. Deliberately
//! conservative: dynamic access via `globals()`, string references, and
//! re-export conventions are not modeled, so results are reported rather
//! than silently acted on.

use crate::parsers::python::ModuleIndex;
use indexmap::IndexSet;

/// Names bound by imports and never referenced, in first-appearance order.
pub fn detect_unused_imports(index: &ModuleIndex) -> IndexSet<String> {
    let mut unused = IndexSet::new();
    for statement in &index.imports {
        for name in statement.bound_names() {
            if !index.stats.plain.contains_key(name) {
                unused.insert(name.to_string());
            }
        }
    }
    unused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::python::{index_module, parse_module};

    fn unused(source: &str) -> Vec<String> {
        let suite = parse_module(source, "test.py").expect("should parse test source");
        let index = index_module(&suite, source);
        detect_unused_imports(&index).into_iter().collect()
    }

    #[test]
    fn test_used_imports_not_flagged() {
        let source = r#"
import os
from collections import OrderedDict

print(os.getcwd())
d = OrderedDict()
"#;
        assert!(unused(source).is_empty());
    }

    #[test]
    fn test_unused_module_and_member() {
        let source = r#"
import os
import sys
from json import dumps, loads

print(os.getcwd())
dumps({})
"#;
        assert_eq!(unused(source), vec!["sys", "loads"]);
    }

    #[test]
    fn test_alias_is_the_tracked_name() {
        let source = r#"
import numpy as np
import pandas as pd

np.zeros(3)
"#;
        assert_eq!(unused(source), vec!["pd"]);
    }

    #[test]
    fn test_dotted_import_binds_first_segment() {
        let source = r#"
import os.path
import xml.etree

os.path.join("a", "b")
"#;
        assert_eq!(unused(source), vec!["xml"]);
    }

    #[test]
    fn test_wildcard_never_flagged() {
        let source = "from os import *\n";
        assert!(unused(source).is_empty());
    }

    #[test]
    fn test_assignment_counts_as_reference() {
        // Shadowing assignment still counts as a plain-name occurrence.
        let source = "import os\nos = None\n";
        assert!(unused(source).is_empty());
    }
}
