//! Protocol adapters

pub mod console;

pub use console::{ConsoleOutbound, ConsoleSource};
