//! Fallback command - answers text that names no command.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler};

pub struct FallbackHandler;

#[async_trait]
impl CommandHandler for FallbackHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let text = ctx.args.str("text").unwrap_or_default();
        let word = text.split_whitespace().next().unwrap_or_default();
        ctx.reply(
            SystemMessageKind::Warning,
            &format!("I don't know `{}`. Try `{}help`.", word, ctx.prefix),
        )
        .await?;
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("fallback")
        .description("Replies to unknown commands")
        .category("General")
        .as_default()
        .native()
        .arg(ArgumentSpec::rest("text").all())
        .handler(FallbackHandler)
}
