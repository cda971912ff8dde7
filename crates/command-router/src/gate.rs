//! Checks run before a handler, in order, stopping at the first failure.

use crate::command::{ChannelType, Command};
use crate::cooldown::cooldown_key;
use crate::middleware::{MiddlewareData, MiddlewareResult};
use chat_platform::{Message, Platform};
use cooldown_store::{CooldownStatus, CooldownStore};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a gate stopped an invocation. Display text is user-facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateFailure {
    #[error("This command is on cooldown, try again in {remaining_secs}s")]
    Cooldown { remaining_secs: u64 },

    #[error("This command can only be used in a server")]
    GuildOnly,

    #[error("This command can only be used in direct messages")]
    DmOnly,

    #[error("Only the server owner can use this command")]
    GuildOwnerOnly,

    #[error("Only the bot owner can use this command")]
    BotOwnerOnly,

    #[error("I am missing permissions: {}", .0.join(", "))]
    BotPermissions(Vec<String>),

    #[error("You are missing permissions: {}", .0.join(", "))]
    UserPermissions(Vec<String>),

    #[error("You need one of these roles: {}", .0.join(", "))]
    MissingRole(Vec<String>),

    #[error("Your roles do not allow this command: {}", .0.join(", "))]
    DeniedRole(Vec<String>),

    #[error("This command can only be used in NSFW channels")]
    NsfwOnly,

    #[error("{reason}")]
    Middleware { name: String, reason: String },

    /// Middleware aborted without a message.
    #[error("Stopped by middleware '{0}'")]
    Silenced(String),

    #[error("{0}")]
    Unavailable(String),
}

impl GateFailure {
    /// Silent failures are not reported to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, GateFailure::Silenced(_))
    }
}

/// The gate chain shared by every dispatch.
#[derive(Clone, Default)]
pub struct Gates {
    cooldowns: CooldownStore,
    owner_ids: HashSet<String>,
    bot_id: Option<String>,
}

impl Gates {
    pub fn new<I, S>(cooldowns: CooldownStore, owner_ids: I, bot_id: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cooldowns,
            owner_ids: owner_ids.into_iter().map(Into::into).collect(),
            bot_id,
        }
    }

    pub fn cooldowns(&self) -> &CooldownStore {
        &self.cooldowns
    }

    /// Run every gate for `command`; on success returns the middleware data.
    pub async fn check(
        &self,
        command: &Command,
        message: &Message,
        platform: &dyn Platform,
    ) -> Result<MiddlewareData, GateFailure> {
        self.check_cooldown(command, message).await?;
        check_channel_type(command, message)?;
        self.check_ownership(command, message)?;
        self.check_permissions(command, message, platform).await?;
        check_roles(command, message)?;
        check_nsfw(command, message)?;
        run_middlewares(command, message).await
    }

    async fn check_cooldown(&self, command: &Command, message: &Message) -> Result<(), GateFailure> {
        let Some(key) = cooldown_key(command, message) else {
            return Ok(());
        };
        match self.cooldowns.status(&key.slug()).await {
            CooldownStatus::Ready => Ok(()),
            CooldownStatus::Blocked { remaining } => {
                let remaining_secs = remaining.as_millis().div_ceil(1000) as u64;
                debug!(slug = %key.slug(), remaining_secs, "Cooldown blocked invocation");
                Err(GateFailure::Cooldown { remaining_secs })
            }
        }
    }

    fn check_ownership(&self, command: &Command, message: &Message) -> Result<(), GateFailure> {
        if command.guild_owner_only {
            let is_owner = message
                .guild
                .as_ref()
                .map(|g| g.owner_id == message.author.id)
                .unwrap_or(false);
            if !is_owner {
                return Err(GateFailure::GuildOwnerOnly);
            }
        }
        if command.bot_owner_only && !self.owner_ids.contains(&message.author.id) {
            return Err(GateFailure::BotOwnerOnly);
        }
        Ok(())
    }

    /// Permissions are looked up live and only apply inside guilds.
    async fn check_permissions(
        &self,
        command: &Command,
        message: &Message,
        platform: &dyn Platform,
    ) -> Result<(), GateFailure> {
        if message.is_dm() {
            return Ok(());
        }

        if !command.bot_permissions.is_empty() {
            match &self.bot_id {
                Some(bot_id) => {
                    let missing = missing_permissions(platform, bot_id, message, &command.bot_permissions).await?;
                    if !missing.is_empty() {
                        return Err(GateFailure::BotPermissions(missing));
                    }
                }
                None => debug!(command = %command.path(), "No bot id configured, skipping bot permissions"),
            }
        }

        if !command.user_permissions.is_empty() {
            let missing =
                missing_permissions(platform, &message.author.id, message, &command.user_permissions).await?;
            if !missing.is_empty() {
                return Err(GateFailure::UserPermissions(missing));
            }
        }

        Ok(())
    }
}

async fn missing_permissions(
    platform: &dyn Platform,
    user_id: &str,
    message: &Message,
    required: &[String],
) -> Result<Vec<String>, GateFailure> {
    let held = platform.permissions(user_id, message).await.map_err(|e| {
        warn!(user_id, error = %e, "Permission lookup failed");
        GateFailure::Unavailable("Could not check permissions, try again later".into())
    })?;
    Ok(required
        .iter()
        .filter(|p| !held.contains(p.as_str()))
        .cloned()
        .collect())
}

fn check_channel_type(command: &Command, message: &Message) -> Result<(), GateFailure> {
    match command.channel_type {
        ChannelType::Guild if message.is_dm() => Err(GateFailure::GuildOnly),
        ChannelType::Dm if !message.is_dm() => Err(GateFailure::DmOnly),
        _ => Ok(()),
    }
}

fn check_roles(command: &Command, message: &Message) -> Result<(), GateFailure> {
    let held = message.author_roles();

    if !command.allow_roles.is_empty() && !command.allow_roles.iter().any(|r| held.contains(r)) {
        return Err(GateFailure::MissingRole(command.allow_roles.clone()));
    }

    let denied: Vec<String> = command
        .deny_roles
        .iter()
        .filter(|r| held.contains(r))
        .cloned()
        .collect();
    if !denied.is_empty() {
        return Err(GateFailure::DeniedRole(denied));
    }

    Ok(())
}

fn check_nsfw(command: &Command, message: &Message) -> Result<(), GateFailure> {
    if command.nsfw && !message.channel.nsfw {
        return Err(GateFailure::NsfwOnly);
    }
    Ok(())
}

async fn run_middlewares(command: &Command, message: &Message) -> Result<MiddlewareData, GateFailure> {
    let mut data = MiddlewareData::new();
    for middleware in &command.middlewares {
        match middleware.run(message, command, &mut data).await {
            MiddlewareResult::Pass => {}
            MiddlewareResult::Abort => {
                debug!(middleware = middleware.name(), "Middleware aborted");
                return Err(GateFailure::Silenced(middleware.name().to_string()));
            }
            MiddlewareResult::Reject(reason) => {
                return Err(GateFailure::Middleware {
                    name: middleware.name().to_string(),
                    reason,
                });
            }
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use async_trait::async_trait;
    use chat_platform::{
        Channel, Entity, EntityKind, Guild, InMemoryPlatform, Member, PlatformError, SystemMessageKind, User,
    };
    use cooldown_store::{CooldownKey, CooldownScope};
    use futures::FutureExt;
    use mockall::mock;
    use std::collections::HashSet;
    use std::time::Duration;

    mock! {
        pub Platform {}

        #[async_trait]
        impl Platform for Platform {
            async fn send_system_message(
                &self,
                message: &Message,
                kind: SystemMessageKind,
                content: &str,
            ) -> Result<(), PlatformError>;

            async fn fetch_entity(
                &self,
                kind: EntityKind,
                id: &str,
                message: &Message,
            ) -> Result<Option<Entity>, PlatformError>;

            async fn permissions(
                &self,
                user_id: &str,
                message: &Message,
            ) -> Result<HashSet<String>, PlatformError>;
        }
    }

    fn member(id: &str, roles: &[&str]) -> Member {
        Member {
            user: User::new(id, "someone"),
            guild_id: "g1".into(),
            nickname: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn guild_message(author: Member) -> Message {
        let guild = Guild {
            id: "g1".into(),
            name: "Guild".into(),
            owner_id: "owner".into(),
        };
        Message::in_guild("m1", author, Channel::text("c1", "general", "g1"), guild, "!cmd")
    }

    fn dm() -> Message {
        Message::direct("m1", User::new("u1", "alice"), "cmd")
    }

    async fn check(gates: &Gates, command: &Command, message: &Message) -> Result<MiddlewareData, GateFailure> {
        gates.check(command, message, &InMemoryPlatform::new()).await
    }

    #[tokio::test]
    async fn test_channel_type() {
        let gates = Gates::default();
        let guild_only = Command::new("ban").guild_only();
        assert_eq!(check(&gates, &guild_only, &dm()).await.unwrap_err(), GateFailure::GuildOnly);

        let dm_only = Command::new("secret").dm_only();
        let message = guild_message(member("u1", &[]));
        assert_eq!(check(&gates, &dm_only, &message).await.unwrap_err(), GateFailure::DmOnly);
        assert!(check(&gates, &dm_only, &dm()).await.is_ok());
    }

    #[tokio::test]
    async fn test_ownership() {
        let gates = Gates::new(CooldownStore::new(), ["boss"], None);
        let command = Command::new("shutdown").bot_owner_only();
        assert_eq!(check(&gates, &command, &dm()).await.unwrap_err(), GateFailure::BotOwnerOnly);
        let boss = Message::direct("m1", User::new("boss", "boss"), "shutdown");
        assert!(check(&gates, &command, &boss).await.is_ok());

        let command = Command::new("prune").guild_owner_only();
        let message = guild_message(member("u1", &[]));
        assert_eq!(check(&gates, &command, &message).await.unwrap_err(), GateFailure::GuildOwnerOnly);
        let message = guild_message(member("owner", &[]));
        assert!(check(&gates, &command, &message).await.is_ok());
    }

    #[tokio::test]
    async fn test_permissions_are_live() {
        let gates = Gates::new(CooldownStore::new(), Vec::<String>::new(), Some("bot".into()));
        let platform = InMemoryPlatform::new().with_permissions("bot", ["KICK_MEMBERS"]);
        let command = Command::new("kick")
            .user_permission("KICK_MEMBERS")
            .bot_permission("KICK_MEMBERS");
        let message = guild_message(member("u1", &[]));

        let err = gates.check(&command, &message, &platform).await.unwrap_err();
        assert_eq!(err, GateFailure::UserPermissions(vec!["KICK_MEMBERS".into()]));
        assert_eq!(err.to_string(), "You are missing permissions: KICK_MEMBERS");

        platform.set_permissions("u1", ["KICK_MEMBERS"]).await;
        assert!(gates.check(&command, &message, &platform).await.is_ok());
    }

    #[tokio::test]
    async fn test_bot_permissions_checked_first() {
        let gates = Gates::new(CooldownStore::new(), Vec::<String>::new(), Some("bot".into()));
        let command = Command::new("kick").bot_permission("KICK_MEMBERS");
        let message = guild_message(member("u1", &[]));
        assert_eq!(
            check(&gates, &command, &message).await.unwrap_err(),
            GateFailure::BotPermissions(vec!["KICK_MEMBERS".into()])
        );
    }

    #[tokio::test]
    async fn test_permission_lookup_failure() {
        let gates = Gates::default();
        let mut platform = MockPlatform::new();
        platform
            .expect_permissions()
            .times(1)
            .returning(|_, _| Err(PlatformError::FetchFailed("timeout".into())));
        let command = Command::new("kick").user_permission("KICK_MEMBERS");
        let message = guild_message(member("u1", &[]));

        let err = gates.check(&command, &message, &platform).await.unwrap_err();
        assert!(matches!(err, GateFailure::Unavailable(_)));
        assert!(!err.is_silent());
    }

    #[tokio::test]
    async fn test_permissions_skipped_in_dm() {
        let gates = Gates::default();
        let command = Command::new("kick").user_permission("KICK_MEMBERS");
        assert!(check(&gates, &command, &dm()).await.is_ok());
    }

    #[tokio::test]
    async fn test_roles() {
        let gates = Gates::default();
        let command = Command::new("mod").allow_role("r-mod").deny_role("r-muted");

        let ok = guild_message(member("u1", &["r-mod"]));
        assert!(check(&gates, &command, &ok).await.is_ok());

        let none = guild_message(member("u1", &["r-other"]));
        assert_eq!(
            check(&gates, &command, &none).await.unwrap_err(),
            GateFailure::MissingRole(vec!["r-mod".into()])
        );

        let denied = guild_message(member("u1", &["r-mod", "r-muted"]));
        assert_eq!(
            check(&gates, &command, &denied).await.unwrap_err(),
            GateFailure::DeniedRole(vec!["r-muted".into()])
        );

        assert!(matches!(
            check(&gates, &command, &dm()).await.unwrap_err(),
            GateFailure::MissingRole(_)
        ));
    }

    #[tokio::test]
    async fn test_nsfw() {
        let gates = Gates::default();
        let command = Command::new("lewd").nsfw();
        let mut message = guild_message(member("u1", &[]));
        assert_eq!(check(&gates, &command, &message).await.unwrap_err(), GateFailure::NsfwOnly);
        message.channel.nsfw = true;
        assert!(check(&gates, &command, &message).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_blocks_only_when_armed() {
        let store = CooldownStore::new();
        let gates = Gates::new(store.clone(), Vec::<String>::new(), None);
        let command = Command::new("roll").cooldown(Duration::from_secs(10), CooldownScope::User);
        let message = dm();

        assert!(check(&gates, &command, &message).await.is_ok());

        let slug = CooldownKey::new("roll", CooldownScope::User, "u1").slug();
        store.arm(&slug, Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(
            check(&gates, &command, &message).await.unwrap_err(),
            GateFailure::Cooldown { remaining_secs: 8 }
        );

        tokio::time::advance(Duration::from_millis(7500)).await;
        assert!(check(&gates, &command, &message).await.is_ok());
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let gates = Gates::default();
        let command = Command::new("cmd")
            .middleware(FnMiddleware::new("first", |_, _, data| {
                async move {
                    data.insert("seen", true);
                    MiddlewareResult::Pass
                }
                .boxed()
            }))
            .middleware(FnMiddleware::new("second", |_, _, data| {
                async move { MiddlewareResult::from(data.contains("seen")) }.boxed()
            }));
        let data = check(&gates, &command, &dm()).await.unwrap();
        assert_eq!(data.get_as::<bool>("seen"), Some(true));

        let rejecting = Command::new("cmd")
            .middleware(FnMiddleware::new("gate", |_, _, _| async { MiddlewareResult::from("Not today") }.boxed()));
        let err = check(&gates, &rejecting, &dm()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not today");
        assert!(!err.is_silent());

        let aborting = Command::new("cmd")
            .middleware(FnMiddleware::new("quiet", |_, _, _| async { MiddlewareResult::Abort }.boxed()));
        let err = check(&gates, &aborting, &dm()).await.unwrap_err();
        assert!(err.is_silent());
    }
}
