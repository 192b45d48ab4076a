//! Scan request DTOs

use serde::{Deserialize, Serialize};

use crate::domain::options::{PackageOptions, ScanOptions};

/// Package scan submitted by the web form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScanRequest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub ort_config_repo: Option<String>,
}

impl PackageScanRequest {
    /// Converts the request into scan options
    ///
    /// `default_config_repo` is used when the form left the repository empty.
    pub fn into_options(self, default_config_repo: &str) -> ScanOptions {
        let ort_config_repo_url = self
            .ort_config_repo
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_config_repo.to_string());

        ScanOptions::Package(PackageOptions {
            package_name: self.name,
            package_version: self.version,
            ort_config_repo_url,
        })
    }
}
