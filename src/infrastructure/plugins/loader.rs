//! Registry loader - scans plugin locations and builds a fresh registry

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::application::errors::PluginError;
use crate::plugins::handler::panic_message;
use crate::plugins::{PluginModule, Registrar, Registry};
use super::manifest::{PackageManifest, MANIFEST_FILE};

/// Turns files inside a plugin location into modules
pub trait ModuleLoader: Send + Sync {
    /// Whether `path` looks like a module this loader understands
    fn accepts(&self, path: &Path) -> bool;

    /// Module name for `path`, without the package qualifier
    fn module_name(&self, path: &Path) -> Option<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
    }

    /// Load a fresh copy of the module at `path`
    fn load(&self, path: &Path) -> Result<Box<dyn PluginModule>, PluginError>;
}

/// Builds registries from built-in modules plus every module found in the
/// configured locations
pub struct RegistryLoader {
    loader: Box<dyn ModuleLoader>,
    builtins: Vec<Box<dyn PluginModule>>,
    seen: HashSet<String>,
}

impl RegistryLoader {
    pub fn new(loader: impl ModuleLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            builtins: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Register `module` ahead of every scanned location
    pub fn with_builtin(mut self, module: impl PluginModule + 'static) -> Self {
        self.builtins.push(Box::new(module));
        self
    }

    /// Build a complete registry from scratch.
    ///
    /// Failures are per module: they are logged, recorded in the registry and
    /// never stop the scan.
    pub fn reload(&mut self, locations: &[PathBuf]) -> Registry {
        let mut registry = Registry::new();

        for module in &self.builtins {
            let qualified = module.name().to_string();
            if let Err(e) = install(&mut registry, module.as_ref(), &qualified) {
                tracing::error!("Error registering {}: {}", qualified, e);
                registry.record_failure(qualified);
            }
        }

        for location in locations {
            self.load_location(&mut registry, location);
        }

        registry.summary().log();
        registry
    }

    fn load_location(&mut self, registry: &mut Registry, location: &Path) {
        let manifest = match PackageManifest::discover(location) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Ignoring {} in {}: {}", MANIFEST_FILE, location.display(), e);
                PackageManifest::default()
            }
        };
        let package = manifest
            .name
            .clone()
            .or_else(|| package_name(location))
            .unwrap_or_else(|| "plugins".to_string());

        let candidates = match self.candidates(location) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Skipping plugin location {}: {}", location.display(), e);
                return;
            }
        };

        for path in candidates {
            let Some(name) = self.loader.module_name(&path) else {
                continue;
            };
            let qualified = format!("{}.{}", package, name);

            if manifest.is_disabled(&name) {
                tracing::debug!("Skipping disabled module {}", qualified);
                continue;
            }

            if self.seen.insert(qualified.clone()) {
                tracing::info!("Importing {}", qualified);
            } else {
                tracing::info!("Reloading {}", qualified);
            }

            let result = self
                .loader
                .load(&path)
                .and_then(|module| install(registry, module.as_ref(), &qualified));

            if let Err(e) = result {
                tracing::error!("Error importing {}: {}", qualified, e);
                registry.record_failure(qualified);
            }
        }
    }

    /// Module files in `location`, sorted by file name
    fn candidates(&self, location: &Path) -> Result<Vec<PathBuf>, PluginError> {
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(location)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || is_package_marker(&path) {
                continue;
            }

            if self.loader.accepts(&path) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

/// Run a module's registration into a private registrar and merge it only if
/// the whole registration succeeded
fn install(registry: &mut Registry, module: &dyn PluginModule, qualified: &str) -> Result<(), PluginError> {
    let mut registrar = Registrar::new(qualified);

    match panic::catch_unwind(AssertUnwindSafe(|| module.register(&mut registrar))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(payload) => {
            return Err(PluginError::Register(format!(
                "panicked: {}",
                panic_message(payload.as_ref())
            )));
        }
    }

    if let Some(handle) = module.keepalive() {
        registry.retain(handle);
    }
    tracing::debug!("{} registered {} handlers", qualified, registrar.len());
    registry.absorb(registrar);
    Ok(())
}

fn is_package_marker(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name == MANIFEST_FILE || name.starts_with('_') || name.starts_with('.'),
        None => true,
    }
}

fn package_name(location: &Path) -> Option<String> {
    let absolute = std::path::absolute(location).unwrap_or_else(|_| location.to_path_buf());
    absolute
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
