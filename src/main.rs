use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use chii_bot::application::errors::BotError;
use chii_bot::application::services::{self, Session};
use chii_bot::infrastructure::adapters::{ConsoleOutbound, ConsoleSource};
use chii_bot::infrastructure::config::Config;
use chii_bot::infrastructure::plugins::{DylibLoader, RegistryLoader};
use chii_bot::plugins::Builtins;

#[derive(Parser)]
#[command(name = "chii")]
#[command(about = "A chat bot with a reloadable plugin registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "bot.yaml", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Load every plugin once and print what was registered
    Plugins {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Plugins { json } => list_plugins(&cli.config, json),
        Commands::Version => {
            println!("chii v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Result<Config, BotError> {
    let config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path)?.with_env()
    } else {
        tracing::warn!("Config file {} not found, using defaults", config_path);
        Config::load_env()
    };
    config.validate()?;
    Ok(config)
}

fn registry_loader(config: &Config) -> RegistryLoader {
    RegistryLoader::new(DylibLoader::new())
        .with_builtin(Builtins::new(config.plugins.reload_role.clone()))
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = Arc::new(load_config(config_path)?);
    tracing::info!("Starting chii as {}", config.bot.nickname);

    let outbound = Arc::new(ConsoleOutbound::new(config.bot.nickname.clone()));
    let mut source = ConsoleSource::stdin(&config);
    let mut session = Session::new(Arc::clone(&config), outbound, registry_loader(&config));

    // Dispatch is single-threaded; the registry never leaves this thread.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        session.connect();
        services::run(&mut session, &mut source, Duration::from_secs(1)).await;
    });

    session.disconnect();
    Ok(())
}

fn list_plugins(config_path: &str, json: bool) -> Result<(), BotError> {
    let config = load_config(config_path)?;
    let registry = registry_loader(&config).reload(&config.plugins.locations);
    let summary = registry.summary();

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| BotError::Internal(format!("Failed to encode summary: {}", e)))?;
        println!("{}", out);
    } else {
        println!("commands ({}): {}", summary.command_count, summary.commands.join(", "));
        for (event_type, handlers) in &summary.events {
            println!("events[{}]: {}", event_type, handlers.join(", "));
        }
        println!("tasks: {}", summary.tasks.join(", "));
        if !summary.failed.is_empty() {
            println!("failed: {}", summary.failed.join(", "));
        }
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| BotError::Internal(format!("Failed to encode config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to bot.yaml and adjust as needed.");
    Ok(())
}
