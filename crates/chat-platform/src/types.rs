//! Chat platform entity and message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    /// Mention syntax for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user as seen from inside one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    pub guild_id: String,
    pub nickname: Option<String>,
    /// Role ids held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Member {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.name)
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
    Thread,
    Dm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    pub guild_id: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
}

impl Channel {
    /// Direct-message channel with a single user.
    pub fn dm(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "direct-message".into(),
            kind: ChannelKind::Dm,
            guild_id: None,
            nsfw: false,
        }
    }

    /// Text channel inside a guild.
    pub fn text(id: impl Into<String>, name: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ChannelKind::Text,
            guild_id: Some(guild_id.into()),
            nsfw: false,
        }
    }

    pub fn is_dm(&self) -> bool {
        self.kind == ChannelKind::Dm
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub guild_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

/// Kinds of entity the platform can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Member,
    Channel,
    Role,
    Emote,
    Invite,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Member => "member",
            EntityKind::Channel => "channel",
            EntityKind::Role => "role",
            EntityKind::Emote => "emote",
            EntityKind::Invite => "invite",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity returned by a platform lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    User(User),
    Member(Member),
    Channel(Channel),
    Role(Role),
    Emote(Emote),
    Invite(Invite),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Member(_) => EntityKind::Member,
            Entity::Channel(_) => EntityKind::Channel,
            Entity::Role(_) => EntityKind::Role,
            Entity::Emote(_) => EntityKind::Emote,
            Entity::Invite(_) => EntityKind::Invite,
        }
    }
}

/// Visual style of a system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMessageKind {
    Default,
    Success,
    Error,
    Warning,
}

/// Inbound message handed to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    /// Raw message text.
    pub content: String,
    pub author: User,
    /// Author as a guild member, present for guild messages.
    pub member: Option<Member>,
    pub channel: Channel,
    pub guild: Option<Guild>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Message sent in a direct-message channel.
    pub fn direct(id: impl Into<String>, author: User, content: impl Into<String>) -> Self {
        let channel = Channel::dm(format!("dm-{}", author.id));
        Self {
            id: id.into(),
            content: content.into(),
            author,
            member: None,
            channel,
            guild: None,
            timestamp: Utc::now(),
        }
    }

    /// Message sent by a guild member in a guild channel.
    pub fn in_guild(
        id: impl Into<String>,
        member: Member,
        channel: Channel,
        guild: Guild,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author: member.user.clone(),
            member: Some(member),
            channel,
            guild: Some(guild),
            timestamp: Utc::now(),
        }
    }

    pub fn is_dm(&self) -> bool {
        self.guild.is_none() || self.channel.is_dm()
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.id.as_str())
    }

    /// Role ids held by the author, empty outside guilds.
    pub fn author_roles(&self) -> &[String] {
        self.member.as_ref().map(|m| m.roles.as_slice()).unwrap_or(&[])
    }

    /// Copy of this message with different text.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Message recorded by a platform implementation after sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel_id: String,
    pub kind: SystemMessageKind,
    pub content: String,
}
