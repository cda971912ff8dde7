//! Cooldown key and state types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// What a cooldown is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownScope {
    /// One shared window for everyone.
    #[default]
    Global,
    /// One window per invoking user.
    User,
    /// One window per guild.
    Guild,
    /// One window per channel.
    Channel,
}

impl CooldownScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CooldownScope::Global => "global",
            CooldownScope::User => "user",
            CooldownScope::Guild => "guild",
            CooldownScope::Channel => "channel",
        }
    }
}

impl fmt::Display for CooldownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one cooldown window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    /// Full command path, e.g. `role add`.
    pub command: String,
    pub scope: CooldownScope,
    /// Id of the user, guild or channel the window belongs to. Unused for global.
    pub subject: String,
}

impl CooldownKey {
    pub fn new(command: impl Into<String>, scope: CooldownScope, subject: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            scope,
            subject: subject.into(),
        }
    }

    /// Deterministic cache key for this window.
    pub fn slug(&self) -> String {
        let command = self.command.split_whitespace().collect::<Vec<_>>().join(".");
        match self.scope {
            CooldownScope::Global => format!("cooldown:{}:global", command),
            scope => format!("cooldown:{}:{}:{}", command, scope, self.subject),
        }
    }
}

/// Cached state of one cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownState {
    pub last_trigger: Instant,
    pub duration: Duration,
    /// Only armed windows rate-limit.
    pub armed: bool,
}

impl CooldownState {
    pub fn expires_at(&self) -> Instant {
        self.last_trigger + self.duration
    }

    /// Time left before the window reopens, `None` if it is open.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if !self.armed {
            return None;
        }
        let expires_at = self.expires_at();
        if now < expires_at {
            Some(expires_at - now)
        } else {
            None
        }
    }
}

/// Result of checking a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    Blocked { remaining: Duration },
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownStatus::Ready)
    }
}
