//! Message handling - command routing and event fan-out

pub mod dispatcher;
pub mod parser;
pub mod router;

pub use dispatcher::{events, DispatchReport, EventDispatcher};
pub use parser::{CommandParser, ParsedCommand};
pub use router::{CommandRouter, Reply};
