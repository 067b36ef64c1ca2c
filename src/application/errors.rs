//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while locating, loading or registering a plugin module
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to load module: {0}")]
    Load(String),

    #[error("Missing entry point: {0}")]
    Symbol(String),

    #[error("Invalid package manifest: {0}")]
    Manifest(String),

    #[error("Registration failed: {0}")]
    Register(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults raised by a handler body.
///
/// These never cross the dispatch boundary: the router, the event dispatcher
/// and the task scheduler turn them into a one-line diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn failed(msg: impl std::fmt::Display) -> Self {
        HandlerError::Failed(msg.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
