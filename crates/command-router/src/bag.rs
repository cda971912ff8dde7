//! Resolved arguments handed to a command handler.

use arg_types::{ArgumentValue, Pattern};
use chat_platform::{Channel, Member, Role, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Argument values keyed by declared name.
///
/// Every declared argument has a slot; an omitted argument without a default
/// holds `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentBag {
    values: HashMap<String, Option<ArgumentValue>>,
}

impl ArgumentBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<ArgumentValue>) {
        self.values.insert(name.into(), value);
    }

    /// Whether `name` was declared, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name).and_then(|v| v.as_ref())
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_f64())
    }

    /// Number with no fractional part.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    /// Flag state, false when unset.
    pub fn flag(&self, name: &str) -> bool {
        self.boolean(name).unwrap_or(false)
    }

    pub fn date(&self, name: &str) -> Option<&DateTime<Utc>> {
        self.get(name).and_then(|v| v.as_date())
    }

    pub fn duration(&self, name: &str) -> Option<Duration> {
        self.get(name).and_then(|v| v.as_duration())
    }

    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        self.get(name).and_then(|v| v.as_pattern())
    }

    pub fn json(&self, name: &str) -> Option<&serde_json::Value> {
        self.get(name).and_then(|v| v.as_json())
    }

    pub fn array(&self, name: &str) -> Option<&[ArgumentValue]> {
        self.get(name).and_then(|v| v.as_array())
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.get(name).and_then(|v| v.as_user())
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.get(name).and_then(|v| v.as_member())
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.get(name).and_then(|v| v.as_channel())
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.get(name).and_then(|v| v.as_role())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ArgumentValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}
