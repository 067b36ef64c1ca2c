//! Registrar - the explicit registration API plugin modules call at load time

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::Invocation;
use super::context::Context;
use super::handler::{CommandHandler, EventHandler, Handler, HandlerResult, TaskHandler};

/// Metadata for a command registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub restrict: Option<String>,
    pub description: Option<String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            restrict: None,
            description: None,
        }
    }

    /// Replace the default alias (the command's own name) with an explicit list
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the command to members of `role`
    pub fn restrict(mut self, role: impl Into<String>) -> Self {
        self.restrict = Some(role.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Lookup keys for this command: lower-cased, deduplicated, in order
    pub fn resolved_aliases(&self) -> Vec<String> {
        let source = if self.aliases.is_empty() {
            std::slice::from_ref(&self.name)
        } else {
            self.aliases.as_slice()
        };

        let mut aliases: Vec<String> = Vec::with_capacity(source.len());
        for alias in source.iter().map(|a| a.trim().to_lowercase()) {
            if !alias.is_empty() && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        aliases
    }
}

/// Collects the handlers of a single module.
///
/// Nothing reaches the registry until the module's registration function
/// returns successfully, so a failing module leaves no partial state behind.
pub struct Registrar {
    module: String,
    handlers: Vec<Handler>,
}

impl Registrar {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            handlers: Vec::new(),
        }
    }

    /// Qualified name of the module being registered (`package.module`)
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn command<F>(&mut self, spec: CommandSpec, body: F) -> &mut Self
    where
        F: Fn(&Context<'_>, &Invocation) -> HandlerResult + Send + Sync + 'static,
    {
        let aliases = spec.resolved_aliases();
        self.handlers.push(Handler::Command(CommandHandler {
            name: spec.name,
            aliases,
            restrict: spec.restrict,
            description: spec.description,
            module: self.module.clone(),
            body: Arc::new(body),
        }));
        self
    }

    pub fn event<F>(&mut self, event_type: impl Into<String>, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Context<'_>, &Invocation) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.push(Handler::Event(EventHandler {
            name: name.into(),
            event_type: event_type.into(),
            module: self.module.clone(),
            body: Arc::new(body),
        }));
        self
    }

    pub fn task<F>(&mut self, name: impl Into<String>, interval_secs: u64, body: F) -> &mut Self
    where
        F: Fn(&Context<'_>, &Invocation) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.push(Handler::Task(TaskHandler {
            name: name.into(),
            interval: Duration::from_secs(interval_secs),
            module: self.module.clone(),
            body: Arc::new(body),
        }));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn into_handlers(self) -> Vec<Handler> {
        self.handlers
    }
}
