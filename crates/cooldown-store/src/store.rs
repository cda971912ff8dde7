//! Process-wide cooldown cache.

use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Keyed cooldown cache shared by every dispatch.
///
/// Checks are advisory: nothing is held between `status` and `arm`, so two
/// concurrent invocations may both pass before either arms the window.
/// Concurrent writers to the same slug are last-write-wins.
#[derive(Clone, Default)]
pub struct CooldownStore {
    entries: Arc<RwLock<HashMap<String, CooldownState>>>,
}

impl CooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the window identified by `slug` is open.
    pub async fn status(&self, slug: &str) -> CooldownStatus {
        let entries = self.entries.read().await;
        match entries.get(slug).and_then(|s| s.remaining(Instant::now())) {
            Some(remaining) => CooldownStatus::Blocked { remaining },
            None => CooldownStatus::Ready,
        }
    }

    /// Start a window of `duration` from now.
    #[instrument(skip(self))]
    pub async fn arm(&self, slug: &str, duration: Duration) -> CooldownState {
        let state = CooldownState {
            last_trigger: Instant::now(),
            duration,
            armed: true,
        };
        self.entries.write().await.insert(slug.to_string(), state);
        debug!("Cooldown armed");
        state
    }

    pub async fn get(&self, slug: &str) -> Option<CooldownState> {
        self.entries.read().await.get(slug).copied()
    }

    /// Drop the entry for `slug` if its window has closed.
    pub async fn release_if_expired(&self, slug: &str) -> bool {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let expired = entries
            .get(slug)
            .map(|s| s.remaining(now).is_none())
            .unwrap_or(false);
        if expired {
            entries.remove(slug);
            debug!(slug, "Cooldown released");
        }
        expired
    }

    /// Remove every entry whose window has closed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, state| state.remaining(now).is_some());
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Purged {} expired cooldowns", removed);
        }
        removed
    }

    /// Forget a window regardless of its state.
    pub async fn reset(&self, slug: &str) -> bool {
        self.entries.write().await.remove(slug).is_some()
    }

    /// Number of cached entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
