//! Match command - test a regex against text.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler};

pub struct MatchHandler;

#[async_trait]
impl CommandHandler for MatchHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let pattern = ctx
            .args
            .pattern("pattern")
            .ok_or_else(|| anyhow::anyhow!("pattern argument not resolved"))?;
        let text = ctx.args.str("text").unwrap_or_default();

        let found: Vec<&str> = if pattern.is_global() {
            pattern.regex.find_iter(text).map(|m| m.as_str()).collect()
        } else {
            pattern.regex.find(text).map(|m| m.as_str()).into_iter().collect()
        };

        if found.is_empty() {
            ctx.reply(SystemMessageKind::Warning, &format!("No match for {}", pattern))
                .await?;
        } else {
            let quoted: Vec<String> = found.iter().map(|m| format!("`{}`", m)).collect();
            ctx.reply(SystemMessageKind::Success, &format!("Matched {}", quoted.join(", ")))
                .await?;
        }
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("match")
        .alias("regex")
        .description("Test a regex against text")
        .example("match /\\d+/g order 66 and 99")
        .category("Utility")
        .native()
        .arg(ArgumentSpec::positional("pattern", "regex").required())
        .arg(ArgumentSpec::rest("text").required())
        .handler(MatchHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;

    #[tokio::test]
    async fn test_global_match() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher
            .dispatch(&guild_message("!match /\\d+/g order 66 and 99"))
            .await;

        let sent = sent(&platform).await;
        assert_eq!(sent[0].kind, SystemMessageKind::Success);
        assert_eq!(sent[0].content, "Matched `66`, `99`");
    }

    #[tokio::test]
    async fn test_case_insensitive_first_match() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!regex /hello/i Hello hello")).await;
        assert_eq!(sent(&platform).await[0].content, "Matched `Hello`");
    }

    #[tokio::test]
    async fn test_no_match() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!match /x/ abc")).await;
        let sent = sent(&platform).await;
        assert_eq!(sent[0].kind, SystemMessageKind::Warning);
        assert_eq!(sent[0].content, "No match for /x/");
    }

    #[tokio::test]
    async fn test_bad_pattern() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!match abc text")).await;
        let content = sent(&platform).await.remove(0).content;
        assert!(content.starts_with("Bad type for positional `pattern`"));
    }
}
