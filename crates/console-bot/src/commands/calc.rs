//! Calculator command using meval for safe expression evaluation.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler, CooldownScope};
use std::time::Duration;
use tracing::debug;

pub struct CalcHandler;

/// Evaluate and format like `2 + 2 = 4`.
fn evaluate(expression: &str) -> Result<String, meval::Error> {
    let result = meval::eval_str(expression)?;

    if result.fract() == 0.0 && result.abs() < 1e15 {
        Ok(format!("{} = {}", expression, result as i64))
    } else {
        Ok(format!("{} = {}", expression, result))
    }
}

#[async_trait]
impl CommandHandler for CalcHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let expression = ctx.args.str("expression").unwrap_or_default().trim();

        match evaluate(expression) {
            Ok(answer) => {
                ctx.cooldown.trigger().await;
                ctx.send(&answer).await?;
            }
            Err(e) => {
                debug!("Rejected expression {:?}: {}", expression, e);
                ctx.reply(SystemMessageKind::Error, &format!("Could not evaluate `{}`: {}", expression, e))
                    .await?;
            }
        }
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("calc")
        .alias("math")
        .description("Evaluate a math expression")
        .long_description(
            "Supports +, -, *, /, ^, parentheses and functions like sqrt(), sin(), ln(), abs().",
        )
        .example("calc (2 + 3) * 4")
        .example("math sqrt(16)")
        .category("Utility")
        .cooldown(Duration::from_secs(3), CooldownScope::User)
        .native()
        .arg(
            ArgumentSpec::rest("expression")
                .all()
                .required()
                .description("Expression to evaluate")
                .validate_described("at most 200 characters", |value, _| {
                    value.as_str().is_some_and(|s| s.len() <= 200)
                }),
        )
        .handler(CalcHandler)
}
