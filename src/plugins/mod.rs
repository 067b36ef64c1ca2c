//! Plugin contract for chii-bot
//!
//! Modules register commands, event handlers and tasks through a
//! [`Registrar`]; the loader collects them into a fresh [`Registry`].

pub mod builtin;
pub mod context;
pub mod handler;
pub mod module;
pub mod registrar;
pub mod registry;

pub use builtin::Builtins;
pub use context::{BotContext, Context};
pub use handler::{CommandHandler, EventHandler, Handler, HandlerFn, HandlerResult, TaskHandler};
pub use module::{FnModule, PluginModule, RegisterFn};
pub use registrar::{CommandSpec, Registrar};
pub use registry::{Registry, ReloadSummary};
