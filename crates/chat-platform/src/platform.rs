//! The capability surface the command runtime needs from a chat platform.

use crate::error::PlatformError;
use crate::types::{Entity, EntityKind, Message, SystemMessageKind};
use async_trait::async_trait;
use std::collections::HashSet;

/// Chat platform collaborator.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Render and deliver a formatted system message to the channel of `message`.
    async fn send_system_message(
        &self,
        message: &Message,
        kind: SystemMessageKind,
        content: &str,
    ) -> Result<(), PlatformError>;

    /// Look up an entity by bare id (or invite code). `Ok(None)` means not found.
    async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &str,
        message: &Message,
    ) -> Result<Option<Entity>, PlatformError>;

    /// Live permission set of `user_id` in the channel of `message`.
    async fn permissions(
        &self,
        user_id: &str,
        message: &Message,
    ) -> Result<HashSet<String>, PlatformError>;
}
