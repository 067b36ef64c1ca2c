//! Session - one connection's registry and everything that dispatches from it

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::application::messaging::router::reply_target;
use crate::application::messaging::{events, CommandRouter, DispatchReport, EventDispatcher};
use crate::domain::entities::{Invocation, Occurrence, User};
use crate::domain::traits::{EventSource, Outbound};
use crate::infrastructure::config::Config;
use crate::infrastructure::plugins::RegistryLoader;
use crate::plugins::{BotContext, Registry, ReloadSummary};
use super::scheduler::{TaskScheduler, TickReport};

/// Owns the registry for the lifetime of a connection.
///
/// Everything runs on the caller's thread: an occurrence is fully handled,
/// including any reload it triggered, before the next one is looked at.
pub struct Session {
    bot: BotContext,
    registry: Registry,
    loader: RegistryLoader,
    router: CommandRouter,
    dispatcher: EventDispatcher,
    scheduler: TaskScheduler,
}

impl Session {
    pub fn new(config: Arc<Config>, outbound: Arc<dyn Outbound>, loader: RegistryLoader) -> Self {
        let router = CommandRouter::new(config.bot.prefix.clone());
        Self {
            bot: BotContext::new(config, outbound),
            registry: Registry::new(),
            loader,
            router,
            dispatcher: EventDispatcher::new(),
            scheduler: TaskScheduler::new(),
        }
    }

    /// The connection is up: build the registry and announce `load`
    pub fn connect(&mut self) -> ReloadSummary {
        self.bot.log_line(&format!("[connected at {}]", timestamp()));
        self.reload()
    }

    /// The connection is gone; the registry goes with the session
    pub fn disconnect(self) {
        self.bot.log_line(&format!("[disconnected at {}]", timestamp()));
        info!("Session closed with {} commands loaded", self.registry.len());
    }

    /// Rebuild the registry from the configured locations and swap it in
    pub fn reload(&mut self) -> ReloadSummary {
        let registry = self.loader.reload(&self.bot.config().plugins.locations);
        self.registry = registry;
        self.scheduler = TaskScheduler::from_registry(&self.registry, Instant::now());

        let summary = self.registry.summary();
        info!(
            "Registry loaded: {} commands, {} event types, {} tasks",
            summary.commands.len(),
            summary.events.len(),
            summary.tasks.len()
        );

        self.dispatch(events::LOAD, None, &Invocation::default());
        summary
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn bot(&self) -> &BotContext {
        &self.bot
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    pub fn handle(&mut self, occurrence: Occurrence) {
        match occurrence {
            Occurrence::Message { sender, target, text } => self.on_message(&sender, &target, &text),
            Occurrence::Action { sender, target, text } => self.on_action(&sender, &target, &text),
            Occurrence::Joined { user, channel } => self.on_join(&user, &channel),
            Occurrence::NickChanged { old, new } => {
                self.bot.log_line(&format!("{} is now known as {}", old, new));
            }
        }
        self.apply_pending_reload();
    }

    pub fn on_message(&mut self, sender: &User, target: &str, text: &str) {
        self.bot.log_line(&format!("<{}> {}", sender.nick, text));

        let respond = reply_target(&self.bot, sender, target).to_string();
        let invocation = Invocation::from_user(sender, target).with_arg(text);

        self.dispatch(events::MSG, Some(&respond), &invocation);
        if target == self.bot.nickname() {
            self.dispatch(events::PRIVMSG, Some(&respond), &invocation);
        } else {
            self.dispatch(events::PUBMSG, Some(&respond), &invocation);
        }

        if self.router.is_command(text) {
            let reply = self.router.route(&self.bot, &self.registry, sender, target, text);
            // A reload requested by the command completes before its reply goes out.
            self.apply_pending_reload();
            if let Some(reply) = reply {
                reply.deliver(&self.bot);
            }
        }
    }

    pub fn on_action(&mut self, sender: &User, target: &str, text: &str) {
        let respond = reply_target(&self.bot, sender, target).to_string();
        let invocation = Invocation::from_user(sender, target).with_arg(text);
        self.dispatch(events::ACTION, Some(&respond), &invocation);
        self.bot.log_line(&format!("* {} {}", sender.nick, text));
    }

    pub fn on_join(&mut self, user: &User, channel: &str) {
        if user.nick == self.bot.nickname() {
            self.bot.log_line(&format!("[I have joined {}]", channel));
        } else {
            self.bot.log_line(&format!("[{} has joined {}]", user.nick, channel));
        }
        self.dispatch(events::JOIN, None, &Invocation::from_user(user, channel));
    }

    /// Run the tasks due at `now`
    pub fn run_due_tasks(&mut self, now: Instant) -> TickReport {
        let report = self.scheduler.run_due(&self.bot, &self.registry, now);
        self.apply_pending_reload();
        report
    }

    fn dispatch(&self, event_type: &str, respond_to: Option<&str>, invocation: &Invocation) -> DispatchReport {
        self.dispatcher
            .dispatch(&self.bot, &self.registry, event_type, respond_to, invocation)
    }

    fn apply_pending_reload(&mut self) {
        if self.bot.take_reload_request() {
            info!("Reload requested");
            self.reload();
        }
    }
}

/// Drive `session` from `source` until the connection ends, ticking the task
/// scheduler every `tick`
pub async fn run<S: EventSource>(session: &mut Session, source: &mut S, tick: Duration) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            occurrence = source.next_occurrence() => match occurrence {
                Some(occurrence) => session.handle(occurrence),
                None => break,
            },
            _ = ticker.tick() => {
                session.run_due_tasks(Instant::now());
            }
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
