//! Application services - session lifecycle and task scheduling

pub mod scheduler;
pub mod session;

pub use scheduler::{TaskScheduler, TickReport};
pub use session::{run, Session};
