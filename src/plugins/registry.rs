//! Registry - the handler tables a session dispatches from
//!
//! A registry is never patched in place. Every reload builds a fresh one and
//! the session swaps it in with a single assignment.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::handler::{CommandHandler, EventHandler, Handler, TaskHandler};
use super::registrar::Registrar;

/// Command, event and task tables built from one pass over the plugin modules
#[derive(Default)]
pub struct Registry {
    commands: HashMap<String, Arc<CommandHandler>>,
    events: HashMap<String, Vec<EventHandler>>,
    tasks: Vec<TaskHandler>,
    modules: Vec<String>,
    failed: Vec<String>,
    collisions: Vec<String>,
    // Declared last so it drops last: handler bodies may live in these libraries.
    keepalive: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every handler collected by `registrar` into the tables
    pub fn absorb(&mut self, registrar: Registrar) {
        let module = registrar.module().to_string();
        for handler in registrar.into_handlers() {
            self.insert(handler);
        }
        self.modules.push(module);
    }

    pub fn insert(&mut self, handler: Handler) {
        match handler {
            Handler::Command(command) => self.insert_command(command),
            Handler::Event(event) => {
                self.events
                    .entry(event.event_type.clone())
                    .or_default()
                    .push(event);
            }
            Handler::Task(task) => {
                if task.interval.is_zero() {
                    warn!("Ignoring task {} from {}: interval must be positive", task.name, task.module);
                    return;
                }
                self.tasks.push(task);
            }
        }
    }

    fn insert_command(&mut self, command: CommandHandler) {
        let command = Arc::new(command);
        for alias in &command.aliases {
            if let Some(previous) = self.commands.get(alias) {
                warn!(
                    "Commands registry already contains {} (from {}), replacing with {}",
                    alias, previous.module, command.module
                );
                self.collisions.push(alias.clone());
            }
            self.commands.insert(alias.clone(), Arc::clone(&command));
        }
    }

    /// Keep a loaded library mapped for as long as this registry lives
    pub fn retain(&mut self, handle: Arc<dyn Any + Send + Sync>) {
        self.keepalive.push(handle);
    }

    pub fn record_failure(&mut self, module: impl Into<String>) {
        self.failed.push(module.into());
    }

    pub fn command(&self, alias: &str) -> Option<&CommandHandler> {
        self.commands.get(alias).map(Arc::as_ref)
    }

    /// Handlers for `event_type` in registration order
    pub fn events(&self, event_type: &str) -> &[EventHandler] {
        self.events
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tasks(&self) -> &[TaskHandler] {
        &self.tasks
    }

    /// All command aliases, sorted
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn commands(&self) -> impl Iterator<Item = (&str, &CommandHandler)> {
        self.commands.iter().map(|(alias, cmd)| (alias.as_str(), cmd.as_ref()))
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Number of registered aliases
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Number of distinct command handlers still reachable through an alias
    pub fn command_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.commands
            .values()
            .filter(|cmd| seen.insert(Arc::as_ptr(cmd)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty() && self.tasks.is_empty()
    }

    pub fn summary(&self) -> ReloadSummary {
        let events = self
            .events
            .iter()
            .map(|(event_type, handlers)| {
                (
                    event_type.clone(),
                    handlers.iter().map(|h| h.name.clone()).collect(),
                )
            })
            .collect();

        let mut tasks: Vec<String> = self.tasks.iter().map(|t| t.name.clone()).collect();
        tasks.sort();

        ReloadSummary {
            command_count: self.command_count(),
            commands: self.command_names(),
            events,
            tasks,
            modules: self.modules.clone(),
            failed: self.failed.clone(),
            collisions: self.collisions.clone(),
        }
    }
}

/// What a reload produced, for operators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    /// Distinct command handlers; `commands` lists their aliases
    pub command_count: usize,
    pub commands: Vec<String>,
    /// Event type → handler names in dispatch order
    pub events: BTreeMap<String, Vec<String>>,
    pub tasks: Vec<String>,
    pub modules: Vec<String>,
    pub failed: Vec<String>,
    pub collisions: Vec<String>,
}

impl ReloadSummary {
    pub fn log(&self) {
        info!("[commands] ({}) {}", self.command_count, self.commands.join(", "));
        let events: Vec<String> = self
            .events
            .iter()
            .map(|(event_type, names)| format!("{}: {}", event_type, names.join(", ")))
            .collect();
        info!("[events] {}", events.join("; "));
        info!("[tasks] {}", self.tasks.join(", "));
        if !self.failed.is_empty() {
            warn!("[failed] {}", self.failed.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::registrar::CommandSpec;

    fn module_a() -> Registrar {
        let mut r = Registrar::new("commands.a");
        r.command(CommandSpec::new("foo"), |_, _| Ok(Some("a".into())))
            .command(CommandSpec::new("directions").with_aliases(["dir", "route"]), |_, _| Ok(None))
            .event("msg", "first", |_, _| Ok(None));
        r
    }

    fn module_b() -> Registrar {
        let mut r = Registrar::new("commands.b");
        r.command(CommandSpec::new("foo"), |_, _| Ok(Some("b".into())))
            .event("msg", "second", |_, _| Ok(None))
            .task("tick", 60, |_, _| Ok(None));
        r
    }

    #[test]
    fn every_alias_resolves() {
        let mut registry = Registry::new();
        registry.absorb(module_a());

        assert_eq!(registry.command_names(), vec!["dir", "foo", "route"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.command_count(), 2);
        assert_eq!(registry.command("dir").map(|c| c.name.as_str()), Some("directions"));
        assert_eq!(registry.command("route").map(|c| c.name.as_str()), Some("directions"));
        assert!(registry.collisions().is_empty());
    }

    #[test]
    fn last_registration_wins_and_is_recorded() {
        let mut registry = Registry::new();
        registry.absorb(module_a());
        registry.absorb(module_b());

        let foo = registry.command("foo").expect("foo registered");
        assert_eq!(foo.module, "commands.b");
        assert_eq!(registry.collisions(), ["foo".to_string()]);
        // the replaced `foo` no longer counts
        assert_eq!(registry.command_count(), 2);
    }

    #[test]
    fn events_keep_module_order() {
        let mut registry = Registry::new();
        registry.absorb(module_a());
        registry.absorb(module_b());

        let names: Vec<_> = registry.events("msg").iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(registry.events("action").is_empty());
    }

    #[test]
    fn zero_interval_task_is_rejected() {
        let mut r = Registrar::new("tasks.bad");
        r.task("spin", 0, |_, _| Ok(None));
        let mut registry = Registry::new();
        registry.absorb(r);
        assert!(registry.tasks().is_empty());
        assert_eq!(registry.modules(), ["tasks.bad".to_string()]);
    }

    #[test]
    fn summary_lists_everything() {
        let mut registry = Registry::new();
        registry.absorb(module_a());
        registry.absorb(module_b());
        registry.record_failure("commands.broken");

        let summary = registry.summary();
        assert_eq!(summary.command_count, 2);
        assert_eq!(summary.commands, vec!["dir", "foo", "route"]);
        assert_eq!(summary.events["msg"], vec!["first", "second"]);
        assert_eq!(summary.tasks, vec!["tick"]);
        assert_eq!(summary.modules, vec!["commands.a", "commands.b"]);
        assert_eq!(summary.failed, vec!["commands.broken"]);
    }
}
