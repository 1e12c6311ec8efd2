//! Project manifest parsing (sky.toml)
//!
//! ```toml
//! [project]
//! name = "demo"
//! entry = "src/main.sky"
//!
//! [vm]
//! max-frames = 2048
//! trace = false
//!
//! [check]
//! enabled = true
//! ```
//!
//! Every section and field is optional. Unknown keys are rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the project directory
pub const MANIFEST_FILE: &str = "sky.toml";

/// Errors that can occur during manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    ValidationError(String),
}

/// Project manifest (sky.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub project: ProjectConfig,
    pub vm: VmConfig,
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Program run by `sky run` when no file is given, relative to the
    /// manifest's directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct VmConfig {
    /// Call frame limit; the VM default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<usize>,

    /// Write an instruction trace to stderr
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Run the semantic checker before compiling
    pub enabled: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Manifest {
    /// Parse a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load `sky.toml` from `dir`, if there is one.
    pub fn find(dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        if let Some(entry) = &self.project.entry {
            if entry.is_empty() {
                return Err(ManifestError::ValidationError(
                    "project.entry cannot be empty".to_string(),
                ));
            }
            if !(entry.ends_with(".sky") || entry.ends_with(".skyc")) {
                return Err(ManifestError::ValidationError(format!(
                    "project.entry must be a .sky or .skyc file, got {}",
                    entry
                )));
            }
        }

        if self.vm.max_frames == Some(0) {
            return Err(ManifestError::ValidationError(
                "vm.max-frames must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Entry point resolved against the manifest's directory
    pub fn entry_path(&self, root: &Path) -> Option<PathBuf> {
        self.project.entry.as_ref().map(|entry| root.join(entry))
    }

    /// Write manifest to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ManifestError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ManifestError::ValidationError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
