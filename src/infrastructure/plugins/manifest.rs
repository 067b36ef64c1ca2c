//! Package manifest - optional `package.yaml` inside a plugin location

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::application::errors::PluginError;

/// File name of the package marker; never loaded as a module
pub const MANIFEST_FILE: &str = "package.yaml";

/// Package metadata
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageManifest {
    /// Package name used to qualify module names (defaults to the directory name)
    pub name: Option<String>,

    /// Package description
    pub description: Option<String>,

    /// Modules present in the directory but not to be loaded
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PackageManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Manifest(format!("Failed to read manifest: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| PluginError::Manifest(format!("Failed to parse manifest: {}", e)))
    }

    /// Read `package.yaml` from `location` if there is one
    pub fn discover(location: &Path) -> Result<Self, PluginError> {
        let path = location.join(MANIFEST_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn is_disabled(&self, module: &str) -> bool {
        self.disabled.iter().any(|m| m == module)
    }
}
