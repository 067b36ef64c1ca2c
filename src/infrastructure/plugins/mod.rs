//! Plugin loading for chii-bot
//!
//! A plugin location is a directory of modules, optionally with a
//! `package.yaml` manifest. Modules are shared libraries exporting a
//! registration function (see `chii_bot::declare_plugin!`).

pub mod dylib;
pub mod loader;
pub mod manifest;

pub use dylib::DylibLoader;
pub use loader::{ModuleLoader, RegistryLoader};
pub use manifest::PackageManifest;
