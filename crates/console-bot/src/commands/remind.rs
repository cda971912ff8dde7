//! Remind command - sends a note back after a delay.

use async_trait::async_trait;
use chat_platform::{Scheduler, SystemMessageKind, TokioScheduler};
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler, CooldownScope};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

pub struct RemindHandler {
    scheduler: Arc<dyn Scheduler>,
}

impl RemindHandler {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl CommandHandler for RemindHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let delay = ctx
            .args
            .duration("delay")
            .ok_or_else(|| anyhow::anyhow!("delay argument not resolved"))?;
        let note = ctx.args.str("note").unwrap_or("something").to_string();

        let platform = ctx.platform.clone();
        let message = ctx.message.clone();
        let reminder = format!("{}, reminder: {}", message.author.mention(), note);
        self.scheduler.schedule(
            delay,
            async move {
                if let Err(e) = platform
                    .send_system_message(&message, SystemMessageKind::Default, &reminder)
                    .await
                {
                    warn!("Failed to deliver reminder: {}", e);
                }
            }
            .boxed(),
        );

        ctx.cooldown.trigger().await;
        info!(author = %ctx.message.author.id, ?delay, "Reminder scheduled");
        ctx.reply(
            SystemMessageKind::Success,
            &format!("I'll remind you in {}", humantime::format_duration(delay)),
        )
        .await?;
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("remind")
        .alias("rm")
        .description("Send yourself a reminder later")
        .example("remind 10m stretch")
        .example("remind \"1h 30m\" check the oven")
        .category("Utility")
        .cooldown(Duration::from_secs(10), CooldownScope::User)
        .native()
        .arg(
            ArgumentSpec::positional("delay", "duration")
                .required()
                .validate_described("at most one day", |value, _| {
                    value.as_duration().is_some_and(|d| d <= MAX_DELAY)
                }),
        )
        .arg(ArgumentSpec::rest("note").default_value("something"))
        .handler(RemindHandler::new(Arc::new(TokioScheduler)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use command_router::DispatchOutcome;

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_after_delay() {
        let (dispatcher, platform) = build(vec![command()]);

        let outcome = dispatcher.dispatch(&guild_message("!remind 90s stretch legs")).await;
        assert!(outcome.is_completed());
        let sent_now = sent(&platform).await;
        assert_eq!(sent_now[0].content, "I'll remind you in 1m 30s");

        tokio::time::sleep(Duration::from_secs(89)).await;
        assert!(sent(&platform).await.is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let fired = sent(&platform).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].content, "<@11>, reminder: stretch legs");
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_note_and_cooldown() {
        let (dispatcher, platform) = build(vec![command()]);

        assert!(dispatcher.dispatch(&guild_message("!rm 5s")).await.is_completed());
        let outcome = dispatcher.dispatch(&guild_message("!rm 5s")).await;
        assert!(matches!(outcome, DispatchOutcome::Rejected { .. }));

        tokio::time::sleep(Duration::from_secs(6)).await;
        let contents: Vec<String> = sent(&platform).await.into_iter().map(|m| m.content).collect();
        assert!(contents.contains(&"<@11>, reminder: something".to_string()));
        assert!(contents.iter().any(|c| c.contains("on cooldown, try again in 10s")));
    }

    #[tokio::test]
    async fn test_delay_limit() {
        let (dispatcher, platform) = build(vec![command()]);
        dispatcher.dispatch(&guild_message("!remind 2days later")).await;
        assert_eq!(
            sent(&platform).await[0].content,
            "Bad value tested for positional `delay`: at most one day"
        );
    }
}
