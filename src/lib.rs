//! chii-bot - a chat bot built around a reloadable plugin registry
//!
//! Plugins register commands, event handlers and periodic tasks through a
//! [`plugins::Registrar`]. A [`application::services::Session`] owns the
//! resulting registry for the lifetime of a connection, routes prefixed text
//! to commands, fans occurrences out to event handlers and drives tasks.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
