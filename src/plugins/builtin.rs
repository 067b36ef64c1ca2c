//! Built-in commands that ship with the bot

use crate::application::errors::PluginError;
use crate::domain::entities::Invocation;
use super::context::Context;
use super::handler::HandlerResult;
use super::module::PluginModule;
use super::registrar::{CommandSpec, Registrar};

/// `reload` and `help`
pub struct Builtins {
    reload_role: Option<String>,
}

impl Builtins {
    pub fn new(reload_role: Option<String>) -> Self {
        Self { reload_role }
    }
}

impl PluginModule for Builtins {
    fn name(&self) -> &str {
        "builtin"
    }

    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError> {
        let mut reload = CommandSpec::new("reload")
            .with_aliases(["reload", "rehash"])
            .with_description("reload every plugin module");
        if let Some(role) = &self.reload_role {
            reload = reload.restrict(role.clone());
        }

        registrar
            .command(reload, reload_command)
            .command(
                CommandSpec::new("help").with_description("list commands, or describe one"),
                help_command,
            );
        Ok(())
    }
}

fn reload_command(ctx: &Context<'_>, _inv: &Invocation) -> HandlerResult {
    ctx.request_reload();
    Ok(Some("\u{2}reload !!\u{2} reloaded".to_string()))
}

fn help_command(ctx: &Context<'_>, inv: &Invocation) -> HandlerResult {
    let registry = ctx.registry();
    let roles = ctx.bot().roles();
    let allowed = |restrict: Option<&str>| roles.permitted(restrict, &inv.nick, &inv.host);

    if let Some(name) = inv.arg(0) {
        let name = name.to_lowercase();
        return Ok(Some(match registry.command(&name) {
            Some(cmd) if allowed(cmd.restrict.as_deref()) => match &cmd.description {
                Some(desc) => format!("\u{2}help ?? {}\u{2} >> {}", name, desc),
                None => "\u{2}help ??\u{2} eh wut".to_string(),
            },
            _ => format!("\u{2}help ??\u{2} no such command: {}", name),
        }));
    }

    let available: Vec<&str> = {
        let mut names: Vec<&str> = registry
            .commands()
            .filter(|(_, cmd)| allowed(cmd.restrict.as_deref()))
            .map(|(alias, _)| alias)
            .collect();
        names.sort_unstable();
        names
    };
    Ok(Some(format!(
        "\u{2}help ?? available commands\u{2} >> {}",
        available.join(", ")
    )))
}
