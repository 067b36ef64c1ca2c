//! Handler definitions - the three kinds of registered callables

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::HandlerError;
use crate::domain::entities::Invocation;
use super::context::Context;

/// Handler result: `Ok(None)` means nothing to say
pub type HandlerResult = Result<Option<String>, HandlerError>;

/// Handler body shared by all handler kinds
pub type HandlerFn = Arc<dyn Fn(&Context<'_>, &Invocation) -> HandlerResult + Send + Sync>;

/// A registered command
pub struct CommandHandler {
    pub name: String,
    pub aliases: Vec<String>,
    pub restrict: Option<String>,
    pub description: Option<String>,
    pub module: String,
    pub body: HandlerFn,
}

/// A handler subscribed to one event type
pub struct EventHandler {
    pub name: String,
    pub event_type: String,
    pub module: String,
    pub body: HandlerFn,
}

/// A periodic handler
pub struct TaskHandler {
    pub name: String,
    pub interval: Duration,
    pub module: String,
    pub body: HandlerFn,
}

/// Anything a module can register
pub enum Handler {
    Command(CommandHandler),
    Event(EventHandler),
    Task(TaskHandler),
}

impl CommandHandler {
    pub fn call(&self, ctx: &Context<'_>, invocation: &Invocation) -> HandlerResult {
        call_guarded(&self.body, ctx, invocation)
    }
}

impl EventHandler {
    pub fn call(&self, ctx: &Context<'_>, invocation: &Invocation) -> HandlerResult {
        call_guarded(&self.body, ctx, invocation)
    }
}

impl TaskHandler {
    pub fn call(&self, ctx: &Context<'_>, invocation: &Invocation) -> HandlerResult {
        call_guarded(&self.body, ctx, invocation)
    }
}

/// Run a handler body, turning a panic into `HandlerError::Panicked`
pub fn call_guarded(body: &HandlerFn, ctx: &Context<'_>, invocation: &Invocation) -> HandlerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| body(ctx, invocation))) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// One-line diagnostic for a handler fault, safe to send to a channel
pub fn diagnostic(name: &str, err: &HandlerError) -> String {
    let text = format!("error in {}: {}", name, err);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
