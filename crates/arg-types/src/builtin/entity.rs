//! Platform entity types: user, member, channel, role, emote, invite.
//!
//! Each accepts either mention syntax or a bare id, then asks the platform
//! for the live entity. A token with the wrong shape fails as malformed
//! without touching the platform; a well-formed token the platform does not
//! know fails as not found.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use async_trait::async_trait;
use chat_platform::{Entity, EntityKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").expect("valid user mention regex"));
static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<#(\d+)>$").expect("valid channel mention regex"));
static ROLE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@&(\d+)>$").expect("valid role mention regex"));
static EMOTE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<a?:\w+:(\d+)>$").expect("valid emote regex"));
static INVITE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:discord\.gg|discord(?:app)?\.com/invite)/([\w-]+)/?$")
        .expect("valid invite regex")
});
static INVITE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]{2,32}$").expect("valid invite code regex"));
static SNOWFLAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,20}$").expect("valid id regex"));

/// Resolver for one kind of platform entity.
pub struct EntityResolver {
    kind: EntityKind,
}

impl EntityResolver {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    /// Extract the id (or invite code) from a mention token or bare id.
    pub fn extract_id(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        let mention = match self.kind {
            EntityKind::User | EntityKind::Member => &USER_MENTION,
            EntityKind::Channel => &CHANNEL_MENTION,
            EntityKind::Role => &ROLE_MENTION,
            EntityKind::Emote => &EMOTE_TOKEN,
            EntityKind::Invite => &INVITE_URL,
        };
        if let Some(caps) = mention.captures(raw) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }

        let bare = match self.kind {
            EntityKind::Invite => &INVITE_CODE,
            _ => &SNOWFLAKE,
        };
        bare.is_match(raw).then(|| raw.to_string())
    }

    fn wrap(&self, entity: Entity) -> Option<ArgumentValue> {
        match (self.kind, entity) {
            (EntityKind::User, Entity::User(u)) => Some(ArgumentValue::User(u)),
            (EntityKind::User, Entity::Member(m)) => Some(ArgumentValue::User(m.user)),
            (EntityKind::Member, Entity::Member(m)) => Some(ArgumentValue::Member(m)),
            (EntityKind::Channel, Entity::Channel(c)) => Some(ArgumentValue::Channel(c)),
            (EntityKind::Role, Entity::Role(r)) => Some(ArgumentValue::Role(r)),
            (EntityKind::Emote, Entity::Emote(e)) => Some(ArgumentValue::Emote(e)),
            (EntityKind::Invite, Entity::Invite(i)) => Some(ArgumentValue::Invite(i)),
            _ => None,
        }
    }
}

#[async_trait]
impl TypeResolver for EntityResolver {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn expected(&self) -> Vec<String> {
        let examples: &[&str] = match self.kind {
            EntityKind::User | EntityKind::Member => &["<@123456789>", "123456789"],
            EntityKind::Channel => &["<#123456789>", "123456789"],
            EntityKind::Role => &["<@&123456789>", "123456789"],
            EntityKind::Emote => &["<:name:123456789>", "123456789"],
            EntityKind::Invite => &["https://discord.gg/code", "code"],
        };
        examples.iter().map(|s| s.to_string()).collect()
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(
            (self.kind, value),
            (EntityKind::User, ArgumentValue::User(_))
                | (EntityKind::Member, ArgumentValue::Member(_))
                | (EntityKind::Channel, ArgumentValue::Channel(_))
                | (EntityKind::Role, ArgumentValue::Role(_))
                | (EntityKind::Emote, ArgumentValue::Emote(_))
                | (EntityKind::Invite, ArgumentValue::Invite(_))
        )
    }

    async fn resolve(
        &self,
        raw: &str,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        let id = self.extract_id(raw).ok_or_else(|| {
            TypeResolverError::malformed(
                format!("Invalid {} mention or id", self.kind),
                self.expected(),
                raw,
            )
        })?;

        if self.kind == EntityKind::Member && ctx.message.guild_id().is_none() {
            return Err(TypeResolverError::malformed(
                "Members can only be resolved inside a guild",
                self.expected(),
                raw,
            ));
        }

        debug!(kind = %self.kind, id = %id, "Fetching entity");
        let fetched = match ctx.platform.fetch_entity(self.kind, &id, ctx.message).await {
            Ok(entity) => entity,
            Err(e) => {
                warn!(kind = %self.kind, id = %id, error = %e, "Entity fetch failed");
                None
            }
        };

        fetched.and_then(|e| self.wrap(e)).ok_or_else(|| {
            TypeResolverError::not_found(
                format!("Unknown {}", self.kind),
                self.expected(),
                raw,
            )
        })
    }
}
