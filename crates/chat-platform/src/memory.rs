//! In-memory platform that keeps entities in maps and records sent messages.

use crate::error::PlatformError;
use crate::platform::Platform;
use crate::types::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Platform backed by in-process maps.
///
/// Used as the entity directory of the console bot and as the platform
/// double in tests.
#[derive(Default)]
pub struct InMemoryPlatform {
    entities: RwLock<HashMap<(EntityKind, String), Entity>>,
    members: RwLock<HashMap<(String, String), Member>>,
    permissions: RwLock<HashMap<String, HashSet<String>>>,
    sent: RwLock<Vec<SentMessage>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.entities
            .get_mut()
            .insert((EntityKind::User, user.id.clone()), Entity::User(user));
        self
    }

    /// Register a member; the underlying user becomes fetchable too.
    pub fn with_member(mut self, member: Member) -> Self {
        self.entities.get_mut().insert(
            (EntityKind::User, member.user.id.clone()),
            Entity::User(member.user.clone()),
        );
        self.members
            .get_mut()
            .insert((member.guild_id.clone(), member.user.id.clone()), member);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.entities.get_mut().insert(
            (EntityKind::Channel, channel.id.clone()),
            Entity::Channel(channel),
        );
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.entities
            .get_mut()
            .insert((EntityKind::Role, role.id.clone()), Entity::Role(role));
        self
    }

    pub fn with_emote(mut self, emote: Emote) -> Self {
        self.entities
            .get_mut()
            .insert((EntityKind::Emote, emote.id.clone()), Entity::Emote(emote));
        self
    }

    pub fn with_invite(mut self, invite: Invite) -> Self {
        self.entities.get_mut().insert(
            (EntityKind::Invite, invite.code.clone()),
            Entity::Invite(invite),
        );
        self
    }

    pub fn with_permissions<I, S>(mut self, user_id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.get_mut().insert(
            user_id.into(),
            permissions.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Replace the permission set of a user at runtime.
    pub async fn set_permissions<I, S>(&self, user_id: &str, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.write().await.insert(
            user_id.to_string(),
            permissions.into_iter().map(Into::into).collect(),
        );
    }

    /// All messages sent so far, oldest first.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Drain the recorded messages.
    pub async fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.write().await)
    }
}

#[async_trait]
impl Platform for InMemoryPlatform {
    async fn send_system_message(
        &self,
        message: &Message,
        kind: SystemMessageKind,
        content: &str,
    ) -> Result<(), PlatformError> {
        debug!(channel = %message.channel.id, ?kind, "Recording system message");
        self.sent.write().await.push(SentMessage {
            channel_id: message.channel.id.clone(),
            kind,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &str,
        message: &Message,
    ) -> Result<Option<Entity>, PlatformError> {
        if kind == EntityKind::Member {
            let guild_id = message.guild_id().ok_or(PlatformError::NotInGuild)?;
            let members = self.members.read().await;
            return Ok(members
                .get(&(guild_id.to_string(), id.to_string()))
                .cloned()
                .map(Entity::Member));
        }

        let entities = self.entities.read().await;
        Ok(entities.get(&(kind, id.to_string())).cloned())
    }

    async fn permissions(
        &self,
        user_id: &str,
        _message: &Message,
    ) -> Result<HashSet<String>, PlatformError> {
        let permissions = self.permissions.read().await;
        Ok(permissions.get(user_id).cloned().unwrap_or_default())
    }
}
