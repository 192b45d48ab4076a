//! Scan report parsing
//!
//! The scan tool writes YAML reports into the results directory. A missing
//! or unreadable report means "nothing to evaluate", never an error.

use deepscan_core::domain::violation::Violation;
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Scan result written by the scanner step
pub const SCAN_RESULT_FILE: &str = "scan-result.yml";

/// Evaluation result written by the evaluator step
pub const EVALUATION_RESULT_FILE: &str = "evaluation-result.yml";

/// Reads a YAML report into a value tree
///
/// Returns `None` when the file is missing, unreadable, not valid YAML or
/// an empty document.
pub fn parse_report(path: &Path) -> Option<Value> {
    debug!("Reading report {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read report {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Null) => None,
        Ok(tree) => Some(tree),
        Err(e) => {
            warn!("Report {} is not valid YAML: {}", path.display(), e);
            None
        }
    }
}

/// Whether the report carries a non-empty `evaluator` section
pub fn has_evaluation(tree: &Value) -> bool {
    tree.get("evaluator").is_some_and(|section| !section.is_null())
}

/// Extracts the entries of `evaluator.violations`
///
/// An absent path or a value that is not a list yields no violations.
pub fn extract_violations(tree: &Value) -> Vec<Violation> {
    tree.get("evaluator")
        .and_then(|evaluator| evaluator.get("violations"))
        .and_then(Value::as_sequence)
        .map(|entries| entries.iter().map(to_violation).collect())
        .unwrap_or_default()
}

fn to_violation(entry: &Value) -> Violation {
    Violation {
        rule: field(entry, "rule"),
        package_name: field(entry, "pkg"),
        license: field(entry, "license"),
        license_source: field(entry, "license_source"),
        severity: field(entry, "severity"),
        message: field(entry, "message"),
    }
}

fn field(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
