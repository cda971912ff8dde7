//! Echo command - repeats text back, optionally shouted.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler};

pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let mut text = ctx.args.str("text").unwrap_or_default().to_string();
        if ctx.args.flag("upper") {
            text = text.to_uppercase();
        }
        let times = ctx.args.int("times").unwrap_or(1).max(1) as usize;
        let kind = if ctx.args.flag("success") {
            SystemMessageKind::Success
        } else {
            SystemMessageKind::Default
        };

        ctx.reply(kind, &vec![text; times].join("\n")).await?;
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("echo")
        .alias("say")
        .description("Repeat text back")
        .example("echo hello there")
        .example("say -u --times 3 \"hip hip\"")
        .category("Fun")
        .native()
        .arg(
            ArgumentSpec::option("times", "number")
                .short("t")
                .default_value(1i64)
                .description("How many times to repeat")
                .validate_described("between 1 and 5", |value, _| {
                    value.as_f64().is_some_and(|n| (1.0..=5.0).contains(&n) && n.fract() == 0.0)
                })
                .validation_error_message("`times` must be a whole number from 1 to 5"),
        )
        .arg(ArgumentSpec::flag("upper").short("u").description("Shout it"))
        .arg(ArgumentSpec::flag("success").short("s"))
        .arg(ArgumentSpec::rest("text").required().description("What to say"))
        .handler(EchoHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use command_router::DispatchOutcome;

    #[tokio::test]
    async fn test_plain_echo() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!echo hello   there")).await;
        assert_eq!(sent(&platform).await[0].content, "hello there");
    }

    #[tokio::test]
    async fn test_options_and_clustered_flags() {
        let (dispatcher, platform) = build(vec![command()]);
        let outcome = dispatcher
            .dispatch(&guild_message("!say -us --times 2 \"hip hip\""))
            .await;
        assert!(outcome.is_completed());

        let sent = sent(&platform).await;
        assert_eq!(sent[0].kind, SystemMessageKind::Success);
        assert_eq!(sent[0].content, "HIP HIP\nHIP HIP");
    }

    #[tokio::test]
    async fn test_times_validated() {
        let (dispatcher, platform) = build(vec![command()]);
        let outcome = dispatcher.dispatch(&guild_message("!echo -t 9 hi")).await;
        assert!(matches!(outcome, DispatchOutcome::Rejected { .. }));
        assert_eq!(
            sent(&platform).await[0].content,
            "`times` must be a whole number from 1 to 5"
        );
    }

    #[tokio::test]
    async fn test_times_bad_type() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!echo --times=lots hi")).await;
        let content = sent(&platform).await.remove(0).content;
        assert!(content.starts_with("Bad type for option `times`"));
    }
}
