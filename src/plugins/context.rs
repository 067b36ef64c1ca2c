//! Shared context handed to every handler call

use std::cell::Cell;
use std::sync::Arc;

use crate::domain::entities::RoleTable;
use crate::domain::traits::Outbound;
use crate::infrastructure::config::Config;
use super::registry::Registry;

/// State shared by all handlers for the lifetime of one connection
pub struct BotContext {
    config: Arc<Config>,
    roles: RoleTable,
    outbound: Arc<dyn Outbound>,
    reload_requested: Cell<bool>,
}

impl BotContext {
    pub fn new(config: Arc<Config>, outbound: Arc<dyn Outbound>) -> Self {
        let roles = RoleTable::from_config(&config.roles);
        Self {
            config,
            roles,
            outbound,
            reload_requested: Cell::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// The bot's own nickname; private messages arrive addressed to it
    pub fn nickname(&self) -> &str {
        &self.config.bot.nickname
    }

    pub fn send_message(&self, target: &str, text: &str) {
        self.outbound.send_message(target, text);
    }

    pub fn send_action(&self, target: &str, text: &str) {
        self.outbound.send_action(target, text);
    }

    pub fn log_line(&self, text: &str) {
        self.outbound.log_line(text);
    }

    /// Send `text` as the bot and record it in the activity log
    pub fn say(&self, target: &str, text: &str) {
        self.outbound.send_message(target, text);
        self.outbound.log_line(&format!("<{}> {}", self.nickname(), text));
    }

    pub fn request_reload(&self) {
        self.reload_requested.set(true);
    }

    /// Clear and return the pending reload request
    pub fn take_reload_request(&self) -> bool {
        self.reload_requested.replace(false)
    }
}

/// What a handler body sees: the shared bot context plus the registry it was
/// dispatched from
#[derive(Clone, Copy)]
pub struct Context<'a> {
    bot: &'a BotContext,
    registry: &'a Registry,
}

impl<'a> Context<'a> {
    pub fn new(bot: &'a BotContext, registry: &'a Registry) -> Self {
        Self { bot, registry }
    }

    pub fn bot(&self) -> &'a BotContext {
        self.bot
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn config(&self) -> &'a Config {
        self.bot.config()
    }

    pub fn nickname(&self) -> &'a str {
        self.bot.nickname()
    }

    pub fn send_message(&self, target: &str, text: &str) {
        self.bot.send_message(target, text);
    }

    pub fn send_action(&self, target: &str, text: &str) {
        self.bot.send_action(target, text);
    }

    pub fn log_line(&self, text: &str) {
        self.bot.log_line(text);
    }

    /// Ask the session to rebuild the registry once this dispatch returns
    pub fn request_reload(&self) {
        self.bot.request_reload();
    }
}
