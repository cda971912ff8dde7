//! Role commands - hand out and list guild roles.

use async_trait::async_trait;
use chat_platform::{Member, Message, SystemMessageKind};
use chrono::Utc;
use command_router::{
    ArgumentSpec, ArgumentValue, Command, CommandContext, CommandHandler, FnMiddleware, MiddlewareResult,
};
use futures::FutureExt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Role assignments made through the bot, keyed by guild and member.
#[derive(Clone, Default)]
pub struct RoleBook {
    inner: Arc<RwLock<HashMap<(String, String), BTreeSet<String>>>>,
}

impl RoleBook {
    /// Returns false if the member already had the role.
    pub async fn grant(&self, guild_id: &str, member_id: &str, role_id: &str) -> bool {
        self.inner
            .write()
            .await
            .entry((guild_id.to_string(), member_id.to_string()))
            .or_default()
            .insert(role_id.to_string())
    }

    pub async fn roles(&self, guild_id: &str, member_id: &str) -> Vec<String> {
        self.inner
            .read()
            .await
            .get(&(guild_id.to_string(), member_id.to_string()))
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Roles the member holds on the platform plus those granted here.
async fn held_roles(book: &RoleBook, member: &Member) -> BTreeSet<String> {
    let mut held: BTreeSet<String> = member.roles.iter().cloned().collect();
    held.extend(book.roles(&member.guild_id, &member.user.id).await);
    held
}

pub struct AddRoleHandler {
    book: RoleBook,
}

#[async_trait]
impl CommandHandler for AddRoleHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let target = ctx
            .args
            .member("target")
            .ok_or_else(|| anyhow::anyhow!("target argument not resolved"))?;
        let role = ctx
            .args
            .role("role")
            .ok_or_else(|| anyhow::anyhow!("role argument not resolved"))?;

        if held_roles(&self.book, target).await.contains(&role.id) {
            ctx.reply(
                SystemMessageKind::Warning,
                &format!("{} already has {}", target.display_name(), role.name),
            )
            .await?;
            return Ok(());
        }

        self.book.grant(&target.guild_id, &target.user.id, &role.id).await;
        info!(
            actor = ctx.data.get_as::<String>("actor").as_deref().unwrap_or("unknown"),
            target = %target.user.id,
            role = %role.id,
            "Role granted"
        );

        if ctx.args.flag("quiet") {
            return Ok(());
        }
        let mut text = format!("Gave {} to {}", role.name, target.display_name());
        if let Some(reason) = ctx.args.str("reason") {
            text.push_str(&format!(" ({})", reason));
        }
        ctx.reply(SystemMessageKind::Success, &text).await?;
        Ok(())
    }
}

pub struct ListRolesHandler {
    book: RoleBook,
}

#[async_trait]
impl CommandHandler for ListRolesHandler {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        let target = ctx
            .args
            .member("target")
            .ok_or_else(|| anyhow::anyhow!("target argument not resolved"))?;

        let held = held_roles(&self.book, target).await;
        let text = if held.is_empty() {
            format!("{} has no roles", target.display_name())
        } else {
            let names: Vec<&str> = held.iter().map(String::as_str).collect();
            format!("{} has: {}", target.display_name(), names.join(", "))
        };
        ctx.send(&text).await?;
        Ok(())
    }
}

/// Records who asked, for the audit log line.
fn audit() -> FnMiddleware {
    FnMiddleware::new("audit", |message, _command, data| {
        async move {
            data.insert("actor", message.author.id.clone());
            data.insert("requested_at", Utc::now().to_rfc3339());
            MiddlewareResult::Pass
        }
        .boxed()
    })
}

fn author_member(message: &Message) -> ArgumentValue {
    match &message.member {
        Some(member) => ArgumentValue::Member(member.clone()),
        None => ArgumentValue::User(message.author.clone()),
    }
}

pub fn command(book: RoleBook) -> Command {
    Command::new("role")
        .description("Manage member roles")
        .category("Admin")
        .guild_only()
        .native()
        .sub(
            Command::new("add")
                .alias("give")
                .description("Give a role to a member")
                .example("role add <@2> <@&101> --reason \"helps out\"")
                .guild_only()
                .user_permission("MANAGE_ROLES")
                .bot_permission("MANAGE_ROLES")
                .middleware(audit())
                .arg(ArgumentSpec::positional("target", "member").required())
                .arg(ArgumentSpec::positional("role", "role").required())
                .arg(ArgumentSpec::option("reason", "string").alias("why").short("r"))
                .arg(ArgumentSpec::flag("quiet").short("q").description("Do not announce"))
                .handler(AddRoleHandler { book: book.clone() }),
        )
        .sub(
            Command::new("list")
                .description("List a member's roles")
                .guild_only()
                .arg(
                    ArgumentSpec::positional("target", "member")
                        .default_with(author_member)
                        .description("Defaults to you"),
                )
                .handler(ListRolesHandler { book }),
        )
}
