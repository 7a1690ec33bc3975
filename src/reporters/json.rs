//! JSON reporter
//!
//! Outputs the full RunReport as pretty-printed JSON for machine
//! consumption or piping to jq.

use crate::models::RunReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render report as compact JSON (single line)
#[allow(dead_code)] // Public API helper
pub fn render_compact(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_shape() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");

        assert_eq!(parsed["files_processed"], 2);
        let files = parsed["files"].as_array().expect("files array");
        assert_eq!(files.len(), 2);
        assert_eq!(files[1]["path"], "pkg/module.py");
        assert_eq!(files[1]["formatted"], true);
        assert_eq!(files[1]["renames_suggested"]["recieve"], "receive");
        assert_eq!(files[1]["unused_imports"][0], "sys");
        assert_eq!(parsed["deps_found"][0], "flask==2.3.0");
        assert_eq!(parsed["summary"]["warnings"], 1);
        assert_eq!(parsed["summary"]["errors"], 1);
    }

    #[test]
    fn test_json_severity_and_kind_spelling() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");

        let diagnostics = parsed["files"][1]["diagnostics"]
            .as_array()
            .expect("diagnostics array");
        assert_eq!(diagnostics[0]["severity"], "warning");
        assert_eq!(diagnostics[0]["kind"], "trailing_whitespace");
        assert_eq!(diagnostics[0]["line"], 3);
    }

    #[test]
    fn test_json_render_compact() {
        let report = test_report();
        let json_str = render_compact(&report).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        let _: serde_json::Value = serde_json::from_str(&json_str).expect("parse compact JSON");
    }
}
