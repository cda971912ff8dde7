//! Countdown command - time until (or since) a date.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler};

pub struct CountdownHandler;

fn describe(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = target - now;
    let (days, hours, minutes) = {
        let abs = delta.abs();
        (abs.num_days(), abs.num_hours() % 24, abs.num_minutes() % 60)
    };
    let span = format!("{}d {}h {}m", days, hours, minutes);
    let when = target.format("%Y-%m-%d %H:%M UTC");

    if delta.num_seconds() >= 0 {
        format!("{} is in {}", when, span)
    } else {
        format!("{} was {} ago", when, span)
    }
}

#[async_trait]
impl CommandHandler for CountdownHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let target = ctx
            .args
            .date("date")
            .copied()
            .ok_or_else(|| anyhow::anyhow!("date argument not resolved"))?;
        ctx.send(&describe(target, Utc::now())).await?;
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("countdown")
        .alias("until")
        .description("Show how long until a date")
        .example("countdown 2030-01-01")
        .category("Utility")
        .native()
        .arg(ArgumentSpec::positional("date", "date").required())
        .handler(CountdownHandler)
}
