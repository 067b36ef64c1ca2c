//! Dynamic library loader - plugin modules compiled as `cdylib`s

use std::any::Any;
use std::env::consts::{DLL_EXTENSION, DLL_PREFIX};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::application::errors::PluginError;
use crate::plugins::module::REGISTER_SYMBOL;
use crate::plugins::{PluginModule, RegisterFn, Registrar};
use super::loader::ModuleLoader;

/// Loads shared libraries exporting `chii_plugin_register`.
///
/// Each load maps a uniquely named shadow copy of the file, so reloading an
/// edited library yields its new code instead of the image the platform
/// loader already has cached for the source path.
pub struct DylibLoader {
    shadow_dir: PathBuf,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self {
            shadow_dir: std::env::temp_dir().join("chii-plugins"),
        }
    }

    pub fn with_shadow_dir(shadow_dir: impl Into<PathBuf>) -> Self {
        Self {
            shadow_dir: shadow_dir.into(),
        }
    }

    fn shadow_copy(&self, path: &Path, name: &str) -> Result<PathBuf, PluginError> {
        std::fs::create_dir_all(&self.shadow_dir)?;
        let shadow = self
            .shadow_dir
            .join(format!("{}-{}.{}", name, uuid::Uuid::new_v4(), DLL_EXTENSION));
        std::fs::copy(path, &shadow)
            .map_err(|e| PluginError::Load(format!("Failed to copy {}: {}", path.display(), e)))?;
        Ok(shadow)
    }
}

impl Default for DylibLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for DylibLoader {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == DLL_EXTENSION)
    }

    fn module_name(&self, path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let name = stem.strip_prefix(DLL_PREFIX).filter(|s| !s.is_empty()).unwrap_or(stem);
        Some(name.to_string())
    }

    fn load(&self, path: &Path) -> Result<Box<dyn PluginModule>, PluginError> {
        let name = self
            .module_name(path)
            .ok_or_else(|| PluginError::Load(format!("Bad module file name: {}", path.display())))?;
        let shadow = self.shadow_copy(path, &name)?;

        let library = unsafe { Library::new(&shadow) };

        // The mapping stays valid after the file is unlinked; on platforms
        // that refuse, the copy is left for the OS temp cleanup.
        if let Err(e) = std::fs::remove_file(&shadow) {
            tracing::debug!("Could not remove shadow copy {}: {}", shadow.display(), e);
        }

        let library = library
            .map_err(|e| PluginError::Load(format!("Failed to load library: {}", e)))?;

        let register: RegisterFn = unsafe {
            let symbol: Symbol<RegisterFn> = library
                .get(REGISTER_SYMBOL)
                .map_err(|e| PluginError::Symbol(format!("{}: {}", path.display(), e)))?;
            *symbol
        };

        Ok(Box::new(DylibModule {
            name,
            register,
            library: Arc::new(library),
        }))
    }
}

/// A module living in a mapped shared library
struct DylibModule {
    name: String,
    register: RegisterFn,
    library: Arc<Library>,
}

impl PluginModule for DylibModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError> {
        (self.register)(registrar)
    }

    fn keepalive(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        let handle: Arc<dyn Any + Send + Sync> = self.library.clone();
        Some(handle)
    }
}
