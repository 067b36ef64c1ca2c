//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chii_bot::application::errors::PluginError;
use chii_bot::domain::entities::Occurrence;
use chii_bot::domain::traits::{EventSource, Outbound};
use chii_bot::infrastructure::config::Config;
use chii_bot::infrastructure::plugins::ModuleLoader;
use chii_bot::plugins::{PluginModule, Registrar};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub type Setup = Arc<dyn Fn(&mut Registrar) -> Result<(), PluginError> + Send + Sync>;

/// In-process stand-in for compiled plugins: `<name>.mod` files in a plugin
/// directory load whatever setup is currently defined for `<name>`.
#[derive(Clone, Default)]
pub struct MemoryLoader {
    modules: Arc<Mutex<HashMap<String, Setup>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define<F>(&self, name: &str, setup: F)
    where
        F: Fn(&mut Registrar) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.modules
            .lock()
            .unwrap()
            .insert(name.to_string(), Arc::new(setup));
    }
}

struct MemoryModule {
    name: String,
    setup: Setup,
}

impl PluginModule for MemoryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError> {
        (self.setup)(registrar)
    }
}

impl ModuleLoader for MemoryLoader {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "mod")
    }

    fn load(&self, path: &Path) -> Result<Box<dyn PluginModule>, PluginError> {
        let name = self
            .module_name(path)
            .ok_or_else(|| PluginError::Load(path.display().to_string()))?;
        let setup = self
            .modules
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .ok_or_else(|| PluginError::Load(format!("cannot import {}", name)))?;
        Ok(Box::new(MemoryModule { name, setup }))
    }
}

/// Records everything the bot sends
#[derive(Default)]
pub struct Recorder {
    pub sent: Mutex<Vec<(String, String)>>,
    pub actions: Mutex<Vec<(String, String)>>,
    pub log: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
        self.actions.lock().unwrap().clear();
        self.log.lock().unwrap().clear();
    }
}

impl Outbound for Recorder {
    fn send_message(&self, target: &str, text: &str) {
        self.sent.lock().unwrap().push((target.to_string(), text.to_string()));
    }

    fn send_action(&self, target: &str, text: &str) {
        self.actions.lock().unwrap().push((target.to_string(), text.to_string()));
    }

    fn log_line(&self, text: &str) {
        self.log.lock().unwrap().push(text.to_string());
    }
}

/// Feeds a fixed list of occurrences, then reports the connection closed
pub struct ScriptedSource {
    queue: VecDeque<Occurrence>,
}

impl ScriptedSource {
    pub fn new(occurrences: Vec<Occurrence>) -> Self {
        Self {
            queue: occurrences.into(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_occurrence(&mut self) -> Option<Occurrence> {
        self.queue.pop_front()
    }
}

/// A plugin directory containing one empty `<name>.mod` file per module
pub fn plugin_dir(modules: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for module in modules {
        std::fs::write(dir.path().join(format!("{}.mod", module)), b"").unwrap();
    }
    dir
}

pub fn config(locations: Vec<PathBuf>) -> Config {
    let mut config = Config::default();
    config.plugins.locations = locations;
    config.plugins.reload_role = Some("admins".to_string());
    config.roles.clear();
    config
        .roles
        .insert("admins".to_string(), vec!["zk!is@whatit.is".to_string()]);
    config
}
