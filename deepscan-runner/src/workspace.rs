//! Staging directory management
//!
//! The staging directory is the build context of the scan image and, once
//! the container ran, the place where the scan tool leaves its reports.
//! A stale directory is never reused: it is wiped before each scan.

use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

/// Subdirectory holding the policy configuration inside the workspace
pub const CONFIG_SUBPATH: &str = ".ort/config";

/// Scratch subdirectory used while extracting part of a config clone
pub const TEMP_SUBPATH: &str = ".ort/temp";

/// Placeholder in the package Dockerfile replaced by the config repository URL
pub const CONFIG_REPO_PLACEHOLDER: &str = "${ort-config-repo}";

/// Reports copied to the caller's output directory when present
pub const RESULT_FILES: [&str; 5] = [
    "analyzer-result.yml",
    "scan-result.yml",
    "evaluation-result.yml",
    "bom.cyclonedx.json",
    "scan-report-web-app.html",
];

/// Build context template files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// npm manifest the scanned package is injected into
    Manifest,
    /// Container entry script running the scan tool
    Entrypoint,
    /// Image recipe for package scans
    PackageDockerfile,
    /// Image recipe for local and git project scans
    ProjectDockerfile,
}

impl Template {
    /// File name of the template inside a template directory
    pub fn file_name(self) -> &'static str {
        match self {
            Template::Manifest => "package.json",
            Template::Entrypoint => "entrypoint.sh",
            Template::PackageDockerfile => "Dockerfile.package",
            Template::ProjectDockerfile => "Dockerfile.project",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Template::Manifest => include_str!("../templates/package.json"),
            Template::Entrypoint => include_str!("../templates/entrypoint.sh"),
            Template::PackageDockerfile => include_str!("../templates/Dockerfile.package"),
            Template::ProjectDockerfile => include_str!("../templates/Dockerfile.project"),
        }
    }
}

/// Template source: an override directory with built-in fallbacks
#[derive(Debug, Clone, Default)]
pub struct Templates {
    dir: Option<PathBuf>,
}

impl Templates {
    /// Uses `dir` for templates it contains, built-ins for the rest
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Reads the content of a template
    pub fn load(&self, template: Template) -> Result<String> {
        if let Some(dir) = &self.dir {
            let path = dir.join(template.file_name());
            if path.is_file() {
                debug!("Using template override {}", path.display());
                return fs::read_to_string(&path).map_err(|e| {
                    ScanError::io(format!("failed to read template {}", path.display()), e)
                });
            }
        }
        Ok(template.builtin().to_string())
    }
}

/// The staging directory of a scan
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    templates: Templates,
}

impl Workspace {
    /// Creates a handle; nothing is touched on disk
    pub fn new(root: impl Into<PathBuf>, templates: Templates) -> Self {
        Self {
            root: root.into(),
            templates,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the root, as required by docker bind mounts
    pub fn absolute_root(&self) -> Result<PathBuf> {
        std::path::absolute(&self.root).map_err(|e| {
            ScanError::io(
                format!("failed to resolve workspace {}", self.root.display()),
                e,
            )
        })
    }

    /// Path of an entry inside the workspace
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Deletes the workspace recursively if it exists
    pub fn remove(&self) -> Result<()> {
        if self.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                ScanError::io(
                    format!("failed to remove workspace {}", self.root.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Creates the workspace directory
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            ScanError::io(
                format!("failed to create workspace {}", self.root.display()),
                e,
            )
        })
    }

    /// Creates a subdirectory (and its parents) inside the workspace
    pub fn create_dir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)
            .map_err(|e| ScanError::io(format!("failed to create {}", path.display()), e))?;
        Ok(path)
    }

    /// Writes a template into the workspace under `dest`
    pub fn stage_template(&self, template: Template, dest: &str) -> Result<PathBuf> {
        let content = self.templates.load(template)?;
        let path = self.path(dest);
        fs::write(&path, content)
            .map_err(|e| ScanError::io(format!("failed to write {}", path.display()), e))?;
        Ok(path)
    }

    /// Replaces every occurrence of `token` in a staged file
    pub fn substitute(&self, dest: &str, token: &str, value: &str) -> Result<()> {
        let path = self.path(dest);
        let content = fs::read_to_string(&path)
            .map_err(|e| ScanError::io(format!("failed to read {}", path.display()), e))?;

        if !content.contains(token) {
            warn!("Placeholder {} not found in {}", token, path.display());
        }

        fs::write(&path, content.replace(token, value))
            .map_err(|e| ScanError::io(format!("failed to write {}", path.display()), e))
    }

    /// Builds the manifest with `{name: version}` merged into its dependencies
    pub fn manifest_with_dependency(&self, name: &str, version: &str) -> Result<JsonValue> {
        let mut manifest: JsonValue = serde_json::from_str(&self.templates.load(Template::Manifest)?)?;

        let JsonValue::Object(fields) = &mut manifest else {
            return Err(ScanError::ManifestShape("top level must be a JSON object"));
        };

        let dependencies = fields
            .entry("dependencies")
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !dependencies.is_object() {
            *dependencies = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(dependencies) = dependencies {
            dependencies.insert(name.to_string(), JsonValue::String(version.to_string()));
        }

        Ok(manifest)
    }

    /// Writes `package.json` into the workspace, pretty-printed
    pub fn write_manifest(&self, manifest: &JsonValue) -> Result<PathBuf> {
        let path = self.path("package.json");
        let content = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, content)
            .map_err(|e| ScanError::io(format!("failed to write {}", path.display()), e))?;
        Ok(path)
    }

    /// Copies the directory tree at `source` to `dest_subpath` in the workspace
    ///
    /// An empty `dest_subpath` targets the workspace root.
    pub fn stage_tree(&self, source: &Path, dest_subpath: &str) -> Result<()> {
        // Canonical paths on Windows carry the `\\?\` prefix, which lifts MAX_PATH
        let source = fs::canonicalize(source)
            .map_err(|e| ScanError::io(format!("failed to resolve {}", source.display()), e))?;
        let root = fs::canonicalize(&self.root).map_err(|e| {
            ScanError::io(format!("failed to resolve workspace {}", self.root.display()), e)
        })?;
        let dest = root.join(dest_subpath);
        if dest.starts_with(&source) {
            return Err(ScanError::CopyIntoSelf { from: source, to: dest });
        }

        debug!("Copying {} to {}", source.display(), dest.display());
        copy_dir_recursive(&source, &dest)
            .map_err(|e| ScanError::io(format!("failed to copy {}", source.display()), e))
    }

    /// Deletes a subdirectory of the workspace if it exists
    pub fn remove_dir(&self, relative: impl AsRef<Path>) -> Result<()> {
        let path = self.path(relative);
        if path.exists() {
            fs::remove_dir_all(&path)
                .map_err(|e| ScanError::io(format!("failed to remove {}", path.display()), e))?;
        }
        Ok(())
    }

    /// Deletes the `.git` directory of a checkout inside the workspace
    pub fn remove_git_metadata(&self, relative: &str) -> Result<()> {
        self.remove_dir(Path::new(relative).join(".git"))
    }

    /// Copies the result files present in the workspace to `output_dir`
    ///
    /// Returns the names of the copied files. Absent files are skipped.
    pub fn copy_results(&self, output_dir: &Path) -> Result<Vec<&'static str>> {
        fs::create_dir_all(output_dir).map_err(|e| {
            ScanError::io(format!("failed to create {}", output_dir.display()), e)
        })?;

        let mut copied = Vec::new();
        for file in RESULT_FILES {
            let source = self.path(file);
            if !source.is_file() {
                debug!("Result file {} not produced, skipping", file);
                continue;
            }
            let dest = output_dir.join(file);
            fs::copy(&source, &dest)
                .map_err(|e| ScanError::io(format!("failed to copy {}", source.display()), e))?;
            copied.push(file);
        }
        Ok(copied)
    }
}

/// Recursively copies the contents of `source` into `dest`
///
/// Symbolic links to files are copied as files; links to directories are
/// skipped to avoid cycles.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else if file_type.is_file() {
            fs::copy(&path, &target)?;
        } else if file_type.is_symlink() {
            if fs::metadata(&path)?.is_file() {
                fs::copy(&path, &target)?;
            } else {
                warn!("Skipping directory link {}", path.display());
            }
        }
    }
    Ok(())
}
