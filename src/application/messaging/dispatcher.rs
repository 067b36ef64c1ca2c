//! Event dispatcher - fans one occurrence out to every subscribed handler

use crate::domain::entities::Invocation;
use crate::plugins::handler::diagnostic;
use crate::plugins::{BotContext, Context, Registry};
use super::router::Reply;

/// Event type keys the session emits
pub mod events {
    /// After every registry build
    pub const LOAD: &str = "load";
    /// Every text message, public or private
    pub const MSG: &str = "msg";
    /// Text messages sent to a channel
    pub const PUBMSG: &str = "pubmsg";
    /// Text messages sent to the bot directly
    pub const PRIVMSG: &str = "privmsg";
    /// `/me` actions
    pub const ACTION: &str = "action";
    /// Someone joined a channel
    pub const JOIN: &str = "join";
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failed: usize,
    /// Replies that were sent, in handler order
    pub replies: Vec<Reply>,
}

/// Fans events out to handlers registered for their type
#[derive(Debug, Default)]
pub struct EventDispatcher;

impl EventDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Invoke every handler for `event_type` in registration order.
    ///
    /// Each handler's fault is contained on its own; later handlers still
    /// run. With a `respond_to` target, every non-empty result (including
    /// diagnostics) is sent there and logged as soon as its handler returns.
    pub fn dispatch(
        &self,
        bot: &BotContext,
        registry: &Registry,
        event_type: &str,
        respond_to: Option<&str>,
        invocation: &Invocation,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let handlers = registry.events(event_type);
        if handlers.is_empty() {
            return report;
        }

        let ctx = Context::new(bot, registry);
        for handler in handlers {
            report.invoked += 1;

            let text = match handler.call(&ctx, invocation) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        "Event handler {} ({}) for '{}' failed: {}",
                        handler.name, handler.module, event_type, e
                    );
                    diagnostic(&handler.name, &e)
                }
            };

            if let Some(target) = respond_to {
                if !text.is_empty() {
                    let reply = Reply::new(target, text);
                    reply.deliver(bot);
                    report.replies.push(reply);
                }
            }
        }

        report
    }
}
