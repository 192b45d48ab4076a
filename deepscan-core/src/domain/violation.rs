//! Violation domain types

use serde::{Deserialize, Serialize};

/// A policy rule breach reported by the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: String,
    pub package_name: String,
    pub license: String,
    pub license_source: String,
    pub severity: String,
    pub message: String,
}
