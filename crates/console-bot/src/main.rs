//! Console chat bot - Main entry point.

mod commands;
mod config;
mod console;
mod error;

use crate::config::Config;
use crate::console::{seed_directory, ConsoleIdentity, ConsoleInput, ConsolePlatform, ConsoleReceiver};
use crate::error::AppResult;
use anyhow::Context;
use chat_platform::{IdleTimer, Platform, TokioScheduler};
use command_router::{CommandRegistry, Dispatcher, TypeRegistry};
use cooldown_store::CooldownStore;
use futures::FutureExt;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting console bot...");

    // Register commands; a bad declaration aborts startup
    let shutdown = Arc::new(Notify::new());
    let mut registry = CommandRegistry::new(Arc::new(TypeRegistry::with_builtins()));
    commands::register_all(&mut registry, shutdown.clone())?;

    let platform: Arc<dyn Platform> = Arc::new(ConsolePlatform::stdout(seed_directory(
        &config.console,
        config.bot.bot_id.as_deref(),
    )));
    let identity = ConsoleIdentity::new(&config.console);
    match identity.guild_id() {
        Some(guild) => info!("Speaking as {} in guild {}", config.console.user_name, guild),
        None => info!("Speaking as {} in direct messages", config.console.user_name),
    }

    let cooldowns = CooldownStore::new();
    let dispatcher = Arc::new(
        Dispatcher::new(Arc::new(registry), platform, config.dispatcher_config())
            .with_cooldowns(cooldowns.clone()),
    );

    // Sweep cooldown entries whose release callback never ran
    let purge_interval = config.cooldown.purge_interval;
    let purger = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        loop {
            ticker.tick().await;
            let purged = cooldowns.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired cooldowns", purged);
            }
        }
    });

    // Deactivate after a quiet period
    let idle = IdleTimer::start(Arc::new(TokioScheduler), config.bot.idle_timeout, {
        let shutdown = shutdown.clone();
        move || {
            let shutdown = shutdown.clone();
            async move {
                info!("Idle timeout reached");
                shutdown.notify_one();
            }
            .boxed()
        }
    });

    info!(
        "Listening on stdin (prefix {:?}, idle timeout {:?})...",
        config.bot.prefix, config.bot.idle_timeout
    );

    // Start message receiver
    let receiver = ConsoleReceiver::new(BufReader::new(tokio::io::stdin()), identity);
    let mut stream = Box::pin(receiver.stream());
    let mut in_flight = JoinSet::new();

    // Main message loop
    loop {
        tokio::select! {
            input = stream.next() => {
                let Some(input) = input else {
                    info!("End of input");
                    break;
                };
                idle.touch();

                // Each message is handled independently
                let dispatcher = dispatcher.clone();
                in_flight.spawn(async move {
                    match input {
                        ConsoleInput::Text(message) => dispatcher.dispatch(&message).await,
                        ConsoleInput::Interaction(message, interaction) => {
                            dispatcher.dispatch_interaction(&message, interaction).await
                        }
                    }
                });
            }
            Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                match done {
                    Ok(outcome) => debug!(?outcome, "Dispatch finished"),
                    Err(e) => error!("Dispatch task failed: {}", e),
                }
            }
            _ = shutdown.notified() => {
                info!("Shutdown requested");
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    idle.stop();
    purger.abort();

    // Let running commands finish their replies
    while let Some(done) = in_flight.join_next().await {
        if let Err(e) = done {
            error!("Dispatch task failed: {}", e);
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // Replies go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
