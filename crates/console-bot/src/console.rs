//! Line-oriented console platform.
//!
//! Each stdin line becomes a message from the configured console user.
//! Lines starting with `/` are structured interactions:
//!
//! ```text
//! /role add target=<@2> role=101 quiet
//! ```

use crate::config::ConsoleConfig;
use async_trait::async_trait;
use chat_platform::{
    Channel, Entity, EntityKind, Guild, InMemoryPlatform, Member, Message, Platform, PlatformError, Role,
    SystemMessageKind, User,
};
use command_router::tokens::tokenize;
use command_router::{Interaction, RawValue};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Second member seeded into the console guild so member arguments have a target.
pub const FRIEND_ID: &str = "2";

/// Roles seeded into the console guild.
pub const SEEDED_ROLES: [(&str, &str); 2] = [("101", "Moderators"), ("102", "Members")];

/// Platform that writes system messages to a terminal and looks entities up in memory.
pub struct ConsolePlatform<W = Stdout> {
    directory: InMemoryPlatform,
    out: Mutex<W>,
}

impl ConsolePlatform<Stdout> {
    pub fn stdout(directory: InMemoryPlatform) -> Self {
        Self::new(directory, tokio::io::stdout())
    }
}

impl<W> ConsolePlatform<W>
where
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(directory: InMemoryPlatform, out: W) -> Self {
        Self {
            directory,
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.out.into_inner()
    }
}

/// Terminal rendering of a system message.
pub fn render(kind: SystemMessageKind, content: &str) -> String {
    let tag = match kind {
        SystemMessageKind::Default => return format!("{}\n", content),
        SystemMessageKind::Success => "ok",
        SystemMessageKind::Error => "error",
        SystemMessageKind::Warning => "warn",
    };
    format!("[{}] {}\n", tag, content)
}

#[async_trait]
impl<W> Platform for ConsolePlatform<W>
where
    W: AsyncWrite + Send + Unpin,
{
    async fn send_system_message(
        &self,
        message: &Message,
        kind: SystemMessageKind,
        content: &str,
    ) -> Result<(), PlatformError> {
        debug!(channel = %message.channel.id, ?kind, "Writing system message");
        let mut out = self.out.lock().await;
        out.write_all(render(kind, content).as_bytes())
            .await
            .map_err(|e| PlatformError::SendFailed(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| PlatformError::SendFailed(e.to_string()))
    }

    async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &str,
        message: &Message,
    ) -> Result<Option<Entity>, PlatformError> {
        self.directory.fetch_entity(kind, id, message).await
    }

    async fn permissions(
        &self,
        user_id: &str,
        message: &Message,
    ) -> Result<HashSet<String>, PlatformError> {
        self.directory.permissions(user_id, message).await
    }
}

/// Who the console speaks as and where.
#[derive(Debug, Clone)]
pub struct ConsoleIdentity {
    user: User,
    /// Guild context, absent when the console runs as a direct message.
    place: Option<(Member, Channel, Guild)>,
    next_id: std::sync::Arc<AtomicU64>,
}

impl ConsoleIdentity {
    pub fn new(config: &ConsoleConfig) -> Self {
        let user = User::new(&config.user_id, &config.user_name);
        let place = config
            .guild_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|guild_id| {
                let member = Member {
                    user: user.clone(),
                    guild_id: guild_id.to_string(),
                    nickname: None,
                    roles: config.roles.clone(),
                };
                let mut channel = Channel::text(&config.channel_id, &config.channel_name, guild_id);
                channel.nsfw = config.nsfw;
                let guild = Guild {
                    id: guild_id.to_string(),
                    name: config.guild_name.clone(),
                    owner_id: config
                        .guild_owner_id
                        .clone()
                        .unwrap_or_else(|| config.user_id.clone()),
                };
                (member, channel, guild)
            });

        Self {
            user,
            place,
            next_id: Default::default(),
        }
    }

    /// Message carrying `content` from the console user.
    pub fn message(&self, content: &str) -> Message {
        let id = format!("console-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        match &self.place {
            Some((member, channel, guild)) => {
                Message::in_guild(id, member.clone(), channel.clone(), guild.clone(), content)
            }
            None => Message::direct(id, self.user.clone(), content),
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.place.as_ref().map(|(_, _, guild)| guild.id.as_str())
    }
}

/// Entity directory for the console: the console user, a second member,
/// the channel and a couple of roles.
pub fn seed_directory(config: &ConsoleConfig, bot_id: Option<&str>) -> InMemoryPlatform {
    let identity = ConsoleIdentity::new(config);
    let mut directory = InMemoryPlatform::new()
        .with_permissions(config.user_id.clone(), config.permissions.iter().cloned());

    if let Some(bot_id) = bot_id {
        directory = directory
            .with_user(User {
                bot: true,
                ..User::new(bot_id, "bot")
            })
            .with_permissions(bot_id, config.bot_permissions.iter().cloned());
    }

    match &identity.place {
        Some((member, channel, guild)) => {
            directory = directory
                .with_member(member.clone())
                .with_member(Member {
                    user: User::new(FRIEND_ID, "friend"),
                    guild_id: guild.id.clone(),
                    nickname: None,
                    roles: Vec::new(),
                })
                .with_channel(channel.clone());
            for (id, name) in SEEDED_ROLES {
                directory = directory.with_role(Role {
                    id: id.into(),
                    name: name.into(),
                    guild_id: guild.id.clone(),
                });
            }
        }
        None => {
            directory = directory
                .with_user(identity.user.clone())
                .with_user(User::new(FRIEND_ID, "friend"));
        }
    }

    directory
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Text(Message),
    Interaction(Message, Interaction),
}

/// Parse `/a b key=value ...` into an interaction. Returns `None` for plain text.
pub fn parse_interaction(line: &str) -> Option<Interaction> {
    let body = line.trim().strip_prefix('/')?;
    let mut path = Vec::new();
    let mut options = Vec::new();

    for token in tokenize(body) {
        match token.text.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                options.push((key.to_string(), RawValue::from(value)));
            }
            _ if options.is_empty() => path.push(token.text),
            // A bare name after the options is a flag.
            _ => options.push((token.text, RawValue::Bool(true))),
        }
    }

    if path.is_empty() {
        return None;
    }
    Some(
        options
            .into_iter()
            .fold(Interaction::new(path), |i, (k, v)| i.option(k, v)),
    )
}

/// Turns console lines into inbound messages.
pub struct ConsoleReceiver<R> {
    reader: R,
    identity: ConsoleIdentity,
}

impl<R> ConsoleReceiver<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, identity: ConsoleIdentity) -> Self {
        Self { reader, identity }
    }

    /// Stream of inputs, ending at end of file.
    pub fn stream(self) -> impl Stream<Item = ConsoleInput> {
        async_stream::stream! {
            let mut lines = self.reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        debug!("Received: {}", line.chars().take(50).collect::<String>());
                        let message = self.identity.message(&line);
                        match parse_interaction(&line) {
                            Some(interaction) => yield ConsoleInput::Interaction(message, interaction),
                            None => yield ConsoleInput::Text(message),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Console read error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}
