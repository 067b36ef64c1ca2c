//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Plugins: Module discovery and dynamic loading
//! - Adapters: Protocol clients (console)

pub mod config;
pub mod plugins;
pub mod adapters;
