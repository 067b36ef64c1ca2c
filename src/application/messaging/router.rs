//! Command router - permission-gated command execution

use tracing::{debug, error};

use crate::domain::entities::{Invocation, User};
use crate::plugins::handler::diagnostic;
use crate::plugins::{BotContext, Context, Registry};
use super::parser::{CommandParser, ParsedCommand};

/// A line the bot should send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub target: String,
    pub text: String,
}

impl Reply {
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
        }
    }

    /// Send the reply and record it in the activity log
    pub fn deliver(&self, bot: &BotContext) {
        bot.say(&self.target, &self.text);
    }
}

/// Where a reply to something said in `target` by `sender` should go:
/// back to the sender for private messages, to the channel otherwise
pub fn reply_target<'a>(bot: &BotContext, sender: &'a User, target: &'a str) -> &'a str {
    if target == bot.nickname() {
        &sender.nick
    } else {
        target
    }
}

/// Routes prefixed text to command handlers
pub struct CommandRouter {
    parser: CommandParser,
}

impl CommandRouter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: CommandParser::new(prefix),
        }
    }

    pub fn is_command(&self, text: &str) -> bool {
        self.parser.is_command(text)
    }

    /// Run the command in `text`, if there is one the sender may use.
    ///
    /// Unknown commands and permission denials are indistinguishable: both
    /// return `None` and leave no trace in the activity log. Handler faults
    /// come back as a diagnostic reply. The reply is returned, not sent.
    pub fn route(
        &self,
        bot: &BotContext,
        registry: &Registry,
        sender: &User,
        target: &str,
        text: &str,
    ) -> Option<Reply> {
        let ParsedCommand { name, args } = self.parser.parse(text)?;
        let command = registry.command(&name)?;

        if !bot.roles().permitted(command.restrict.as_deref(), &sender.nick, &sender.host) {
            debug!("Denied {} to {}", name, sender);
            return None;
        }

        let invocation = Invocation::from_user(sender, target).with_args(args);
        let ctx = Context::new(bot, registry);

        let text = match command.call(&ctx, &invocation) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => return None,
            Err(e) => {
                error!("Command {} ({}) failed: {}", name, command.module, e);
                diagnostic(&name, &e)
            }
        };

        Some(Reply::new(reply_target(bot, sender, target), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::HandlerError;
    use crate::domain::traits::Outbound;
    use crate::infrastructure::config::Config;
    use crate::plugins::{CommandSpec, Registrar};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Silent {
        lines: Mutex<Vec<String>>,
    }

    impl Outbound for Silent {
        fn send_message(&self, target: &str, text: &str) {
            self.lines.lock().unwrap().push(format!("{} {}", target, text));
        }
        fn send_action(&self, _target: &str, _text: &str) {}
        fn log_line(&self, _text: &str) {}
    }

    fn bot() -> BotContext {
        let mut config = Config::default();
        config.roles.clear();
        config
            .roles
            .insert("admins".into(), vec!["zk!is@whatit.is".into()]);
        BotContext::new(Arc::new(config), Arc::new(Silent::default()))
    }

    fn registry() -> Registry {
        let mut r = Registrar::new("commands.test");
        r.command(CommandSpec::new("say"), |_, inv| Ok(Some(inv.rest())))
            .command(CommandSpec::new("mode").restrict("admins"), |_, _| Ok(Some("ok".into())))
            .command(CommandSpec::new("ghost").restrict("nobody"), |_, _| Ok(Some("boo".into())))
            .command(CommandSpec::new("quiet"), |_, _| Ok(Some(String::new())))
            .command(CommandSpec::new("fail"), |_, _| Err(HandlerError::failed("no imgur key")))
            .command(CommandSpec::new("panic"), |_, _| panic!("index out of range"))
            .command(CommandSpec::new("whoami"), |_, inv| {
                Ok(Some(format!("{} {} {}", inv.nick, inv.host, inv.target)))
            });
        let mut registry = Registry::new();
        registry.absorb(r);
        registry
    }

    fn zk() -> User {
        User::new("zk", "is@whatit.is")
    }

    #[test]
    fn channel_command_replies_to_channel() {
        let router = CommandRouter::new(".");
        let reply = router.route(&bot(), &registry(), &zk(), "#chii", ".say hello world");
        assert_eq!(reply, Some(Reply::new("#chii", "hello world")));
    }

    #[test]
    fn private_command_replies_to_sender() {
        let router = CommandRouter::new(".");
        let reply = router.route(&bot(), &registry(), &zk(), "chii", ".say psst");
        assert_eq!(reply, Some(Reply::new("zk", "psst")));
    }

    #[test]
    fn handler_sees_sender_and_target() {
        let router = CommandRouter::new(".");
        let reply = router.route(&bot(), &registry(), &zk(), "#chii", ".WhoAmI").unwrap();
        assert_eq!(reply.text, "zk is@whatit.is #chii");
    }

    #[test]
    fn unknown_command_is_silent() {
        let router = CommandRouter::new(".");
        assert_eq!(router.route(&bot(), &registry(), &zk(), "#chii", ".nope"), None);
    }

    #[test]
    fn restricted_command_checks_role() {
        let router = CommandRouter::new(".");
        let bot = bot();
        let registry = registry();
        let stranger = User::new("zk", "spoofed.host");

        assert_eq!(
            router.route(&bot, &registry, &zk(), "#chii", ".mode +o zk"),
            Some(Reply::new("#chii", "ok"))
        );
        assert_eq!(router.route(&bot, &registry, &stranger, "#chii", ".mode +o zk"), None);
    }

    #[test]
    fn unknown_role_denies() {
        let router = CommandRouter::new(".");
        assert_eq!(router.route(&bot(), &registry(), &zk(), "#chii", ".ghost"), None);
    }

    #[test]
    fn empty_result_is_not_sent() {
        let router = CommandRouter::new(".");
        assert_eq!(router.route(&bot(), &registry(), &zk(), "#chii", ".quiet"), None);
    }

    #[test]
    fn faults_become_diagnostics() {
        let router = CommandRouter::new(".");
        let bot = bot();
        let registry = registry();

        let reply = router.route(&bot, &registry, &zk(), "#chii", ".fail").unwrap();
        assert_eq!(reply.text, "error in fail: no imgur key");

        let reply = router.route(&bot, &registry, &zk(), "#chii", ".panic").unwrap();
        assert_eq!(reply.text, "error in panic: panicked: index out of range");

        // still serving
        assert!(router.route(&bot, &registry, &zk(), "#chii", ".say alive").is_some());
    }
}
