//! Task scheduler - drives periodic handlers at their declared intervals

use std::time::Instant;

use crate::domain::entities::Invocation;
use crate::plugins::handler::diagnostic;
use crate::plugins::{BotContext, Context, Registry};

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks that ran, in registration order
    pub ran: Vec<String>,
    pub failed: usize,
}

struct Slot {
    index: usize,
    name: String,
    next_due: Instant,
}

/// Due times for the tasks of one registry.
///
/// Rebuilt from scratch whenever the registry is replaced; slots refer to
/// tasks by position in that registry.
#[derive(Default)]
pub struct TaskScheduler {
    slots: Vec<Slot>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule every task in `registry`, each first due one interval from `now`
    pub fn from_registry(registry: &Registry, now: Instant) -> Self {
        let slots = registry
            .tasks()
            .iter()
            .enumerate()
            .map(|(index, task)| Slot {
                index,
                name: task.name.clone(),
                next_due: now + task.interval,
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Earliest time any task becomes due
    pub fn next_due(&self) -> Option<Instant> {
        self.slots.iter().map(|s| s.next_due).min()
    }

    /// Run every task due at `now`.
    ///
    /// A failing task is logged and rescheduled like any other; it never
    /// stops the remaining tasks. Missed intervals are not caught up.
    pub fn run_due(&mut self, bot: &BotContext, registry: &Registry, now: Instant) -> TickReport {
        let mut report = TickReport::default();
        let ctx = Context::new(bot, registry);
        let tasks = registry.tasks();

        for slot in self.slots.iter_mut().filter(|s| s.next_due <= now) {
            let Some(task) = tasks.get(slot.index).filter(|t| t.name == slot.name) else {
                tracing::warn!("Task {} is no longer registered", slot.name);
                continue;
            };
            slot.next_due = now + task.interval;

            let invocation = Invocation::new(bot.nickname(), "", "");
            match task.call(&ctx, &invocation) {
                Ok(Some(text)) if !text.is_empty() => {
                    bot.log_line(&format!("[{}] {}", task.name, text));
                }
                Ok(_) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Task {} ({}): {}", task.name, task.module, diagnostic(&task.name, &e));
                }
            }
            report.ran.push(task.name.clone());
        }

        report
    }
}
