//! Cooldown keys and the handler-side trigger.

use crate::command::Command;
use chat_platform::{Message, Scheduler};
use cooldown_store::{CooldownKey, CooldownScope, CooldownStore};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Key of the window `message` falls into for `command`, if it has a cooldown.
pub fn cooldown_key(command: &Command, message: &Message) -> Option<CooldownKey> {
    let cooldown = command.cooldown?;
    let subject = match cooldown.scope {
        CooldownScope::Global => String::new(),
        CooldownScope::User => message.author.id.clone(),
        CooldownScope::Guild => message
            .guild_id()
            .unwrap_or(message.channel.id.as_str())
            .to_string(),
        CooldownScope::Channel => message.channel.id.clone(),
    };
    Some(CooldownKey::new(command.path(), cooldown.scope, subject))
}

struct Armable {
    store: CooldownStore,
    slug: String,
    duration: Duration,
    scheduler: Arc<dyn Scheduler>,
}

/// Lets a handler start its command's cooldown window.
///
/// Nothing is armed unless the handler calls [`CooldownTrigger::trigger`],
/// so a failed or aborted invocation never rate-limits.
#[derive(Clone, Default)]
pub struct CooldownTrigger {
    inner: Option<Arc<Armable>>,
}

impl CooldownTrigger {
    pub fn new(
        store: CooldownStore,
        key: &CooldownKey,
        duration: Duration,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Some(Arc::new(Armable {
                store,
                slug: key.slug(),
                duration,
                scheduler,
            })),
        }
    }

    /// Trigger for a command without cooldown.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Arm the window from now and schedule its release at expiry.
    /// Returns false when the command has no cooldown.
    pub async fn trigger(&self) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };

        inner.store.arm(&inner.slug, inner.duration).await;

        let store = inner.store.clone();
        let slug = inner.slug.clone();
        inner.scheduler.schedule(
            inner.duration,
            async move {
                store.release_if_expired(&slug).await;
            }
            .boxed(),
        );
        debug!(slug = %inner.slug, duration = ?inner.duration, "Cooldown triggered");
        true
    }
}

impl std::fmt::Debug for CooldownTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(inner) => f
                .debug_struct("CooldownTrigger")
                .field("slug", &inner.slug)
                .field("duration", &inner.duration)
                .finish(),
            None => f.write_str("CooldownTrigger(disabled)"),
        }
    }
}
