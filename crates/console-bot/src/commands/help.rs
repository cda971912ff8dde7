//! Help command - lists commands or shows usage for one.

use async_trait::async_trait;
use chat_platform::SystemMessageKind;
use command_router::usage::{command_list, usage};
use command_router::{ArgumentSpec, Command, CommandContext, CommandHandler};

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let Some(query) = ctx.args.str("command").filter(|q| !q.is_empty()) else {
            let text = format!(
                "**Commands:**\n{}\n\nUse `{}help <command>` for details.",
                command_list(&ctx.commands, &ctx.prefix),
                ctx.prefix
            );
            ctx.send(&text).await?;
            return Ok(());
        };

        // Walk `role add` style paths down the sub-command tree.
        let mut names = query.split_whitespace();
        let found = names
            .next()
            .and_then(|first| ctx.commands.get(first.trim_start_matches(ctx.prefix.as_str())))
            .map(|c| c.as_ref())
            .and_then(|top| names.try_fold(top, |command, name| command.find_sub(name)));

        match found {
            Some(command) => ctx.send(&usage(command, &ctx.prefix)).await?,
            None => {
                ctx.reply(SystemMessageKind::Warning, &format!("Unknown command `{}`", query))
                    .await?
            }
        }
        Ok(())
    }
}

pub fn command() -> Command {
    Command::new("help")
        .alias("commands")
        .description("Show available commands")
        .example("help")
        .example("help role add")
        .category("General")
        .native()
        .arg(
            ArgumentSpec::rest("command")
                .all()
                .description("Command path to describe"),
        )
        .handler(HelpHandler)
}
