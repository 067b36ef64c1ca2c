//! Plugin module contract

use std::any::Any;
use std::sync::Arc;

use crate::application::errors::PluginError;
use super::registrar::Registrar;

/// Signature of a module's registration entry point
pub type RegisterFn = fn(&mut Registrar) -> Result<(), PluginError>;

/// Exported symbol a dynamic plugin must provide (see [`declare_plugin!`])
pub const REGISTER_SYMBOL: &[u8] = b"chii_plugin_register\0";

/// A loadable unit of handlers
pub trait PluginModule: Send + Sync {
    /// Module name without the package qualifier
    fn name(&self) -> &str;

    /// Register this module's handlers
    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError>;

    /// Handle that must outlive every handler this module registered
    fn keepalive(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }
}

/// A module backed by a plain registration function
pub struct FnModule {
    name: String,
    register: RegisterFn,
}

impl FnModule {
    pub fn new(name: impl Into<String>, register: RegisterFn) -> Self {
        Self {
            name: name.into(),
            register,
        }
    }
}

impl PluginModule for FnModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError> {
        (self.register)(registrar)
    }
}

/// Export a registration function from a plugin `cdylib`.
///
/// ```ignore
/// fn register(r: &mut chii_bot::plugins::Registrar) -> Result<(), chii_bot::application::errors::PluginError> {
///     r.command(CommandSpec::new("sheen"), |_, inv| Ok(Some(format!("TIGER BLOOD {}", inv.nick.to_uppercase()))));
///     Ok(())
/// }
/// chii_bot::declare_plugin!(register);
/// ```
///
/// The plugin must be built with the same compiler and `chii-bot` version as
/// the host: the registrar crosses the boundary as a Rust type.
#[macro_export]
macro_rules! declare_plugin {
    ($register:path) => {
        #[no_mangle]
        pub fn chii_plugin_register(
            registrar: &mut $crate::plugins::Registrar,
        ) -> ::std::result::Result<(), $crate::application::errors::PluginError> {
            $register(registrar)
        }
    };
}
