//! Command declarations and handler interface.

use crate::bag::ArgumentBag;
use crate::cooldown::CooldownTrigger;
use crate::middleware::{Middleware, MiddlewareData};
use crate::registry::CommandRegistry;
use crate::schema::{ArgumentSchema, ArgumentSpec};
use async_trait::async_trait;
use chat_platform::{Message, Platform, PlatformError, SystemMessageKind};
use cooldown_store::CooldownScope;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where a command may be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelType {
    Guild,
    Dm,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    pub duration: Duration,
    pub scope: CooldownScope,
}

/// Everything a handler gets for one invocation.
pub struct CommandContext {
    pub message: Message,
    pub args: ArgumentBag,
    /// Full command path, e.g. `role add`.
    pub path: String,
    /// Prefix configured for this bot.
    pub prefix: String,
    /// Values left by the command's middlewares.
    pub data: MiddlewareData,
    /// Arms the command's cooldown. A no-op for commands without one.
    pub cooldown: CooldownTrigger,
    pub platform: Arc<dyn Platform>,
    /// Every registered command, for help-style handlers.
    pub commands: Arc<CommandRegistry>,
}

impl CommandContext {
    /// Send a system message to the invoking channel.
    pub async fn reply(&self, kind: SystemMessageKind, content: &str) -> Result<(), PlatformError> {
        self.platform.send_system_message(&self.message, kind, content).await
    }

    pub async fn send(&self, content: &str) -> Result<(), PlatformError> {
        self.reply(SystemMessageKind::Default, content).await
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("path", &self.path)
            .field("args", &self.args)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Command body.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<()> {
        (self)(ctx).await
    }
}

/// Case-folded form used to match command names and aliases.
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// A registered command or sub-command.
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub examples: Vec<String>,
    pub category: Option<String>,
    pub channel_type: ChannelType,
    pub cooldown: Option<Cooldown>,
    pub guild_owner_only: bool,
    pub bot_owner_only: bool,
    pub nsfw: bool,
    pub user_permissions: Vec<String>,
    pub bot_permissions: Vec<String>,
    /// Role ids; the author needs at least one.
    pub allow_roles: Vec<String>,
    /// Role ids; holding any rejects the author.
    pub deny_roles: Vec<String>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub args: ArgumentSchema,
    pub subs: Vec<Command>,
    pub is_default: bool,
    /// Shipped with the bot rather than loaded from a plugin.
    pub native: bool,
    pub filepath: Option<PathBuf>,
    /// Where the command was declared, for error reports.
    pub location: &'static Location<'static>,
    /// Names of the parent commands, outermost first. Set on registration.
    pub breadcrumb: Vec<String>,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl Command {
    #[track_caller]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            long_description: None,
            examples: Vec::new(),
            category: None,
            channel_type: ChannelType::All,
            cooldown: None,
            guild_owner_only: false,
            bot_owner_only: false,
            nsfw: false,
            user_permissions: Vec::new(),
            bot_permissions: Vec::new(),
            allow_roles: Vec::new(),
            deny_roles: Vec::new(),
            middlewares: Vec::new(),
            args: ArgumentSchema::new(),
            subs: Vec::new(),
            is_default: false,
            native: false,
            filepath: None,
            location: Location::caller(),
            breadcrumb: Vec::new(),
            handler: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = Some(text.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_type = channel_type;
        self
    }

    pub fn guild_only(self) -> Self {
        self.channel_type(ChannelType::Guild)
    }

    pub fn dm_only(self) -> Self {
        self.channel_type(ChannelType::Dm)
    }

    pub fn cooldown(mut self, duration: Duration, scope: CooldownScope) -> Self {
        self.cooldown = Some(Cooldown { duration, scope });
        self
    }

    pub fn guild_owner_only(mut self) -> Self {
        self.guild_owner_only = true;
        self
    }

    pub fn bot_owner_only(mut self) -> Self {
        self.bot_owner_only = true;
        self
    }

    pub fn nsfw(mut self) -> Self {
        self.nsfw = true;
        self
    }

    pub fn user_permission(mut self, permission: impl Into<String>) -> Self {
        self.user_permissions.push(permission.into());
        self
    }

    pub fn bot_permission(mut self, permission: impl Into<String>) -> Self {
        self.bot_permissions.push(permission.into());
        self
    }

    pub fn allow_role(mut self, role_id: impl Into<String>) -> Self {
        self.allow_roles.push(role_id.into());
        self
    }

    pub fn deny_role(mut self, role_id: impl Into<String>) -> Self {
        self.deny_roles.push(role_id.into());
        self
    }

    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn arg(mut self, spec: ArgumentSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn sub(mut self, command: Command) -> Self {
        self.subs.push(command);
        self
    }

    /// Run this command when no registered name matches.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }

    pub fn filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.filepath = Some(path.into());
        self
    }

    pub fn handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn get_handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.handler.as_ref()
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        let token = name_key(token);
        name_key(&self.name) == token || self.aliases.iter().any(|a| name_key(a) == token)
    }

    pub fn find_sub(&self, token: &str) -> Option<&Command> {
        self.subs.iter().find(|sub| sub.answers_to(token))
    }

    /// Full invocation path, parents first.
    pub fn path(&self) -> String {
        self.breadcrumb
            .iter()
            .chain(std::iter::once(&self.name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Record parent names on every sub-command. Sub-commands take the
    /// parent's `native` flag but none of its gates.
    pub(crate) fn assign_lineage(&mut self, breadcrumb: Vec<String>, native: bool) {
        self.breadcrumb = breadcrumb;
        self.native = native;
        let mut child = self.breadcrumb.clone();
        child.push(self.name.clone());
        for sub in &mut self.subs {
            sub.assign_lineage(child.clone(), native);
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("breadcrumb", &self.breadcrumb)
            .field("args", &self.args)
            .field("subs", &self.subs)
            .field("has_handler", &self.handler.is_some())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
