//! Shutdown command - stops the bot. Owner only.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::{Command, CommandContext, CommandHandler};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

pub struct ShutdownHandler {
    shutdown: Arc<Notify>,
}

#[async_trait]
impl CommandHandler for ShutdownHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        info!(by = %ctx.message.author.id, "Shutdown requested");
        ctx.reply(SystemMessageKind::Warning, "Shutting down...").await?;
        self.shutdown.notify_one();
        Ok(())
    }
}

pub fn command(shutdown: Arc<Notify>) -> Command {
    Command::new("shutdown")
        .alias("quit")
        .description("Stop the bot")
        .category("Admin")
        .bot_owner_only()
        .native()
        .handler(ShutdownHandler { shutdown })
}
