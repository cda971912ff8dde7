//! Ping command - liveness check.

use async_trait::async_trait;
use chrono::Utc;
use command_router::{Command, CommandContext, CommandHandler};

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let latency = (Utc::now() - ctx.message.timestamp).num_milliseconds().max(0);
        ctx.send(&format!("Pong! ({}ms)", latency)).await?;
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("ping")
        .description("Check that the bot is responding")
        .category("General")
        .native()
        .handler(PingHandler)
}
