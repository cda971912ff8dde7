//! Typed argument values.

use chat_platform::{Channel, Emote, Invite, Member, Role, User};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::fmt;
use std::time::Duration;

/// A compiled regex argument together with the flags it was written with.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: Regex,
    pub flags: String,
}

impl Pattern {
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Whether the `g` flag was given.
    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.flags == other.flags
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.regex.as_str(), self.flags)
    }
}

/// A resolved, typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Duration(Duration),
    Regex(Pattern),
    Json(serde_json::Value),
    Array(Vec<ArgumentValue>),
    User(User),
    Member(Member),
    Channel(Channel),
    Role(Role),
    Emote(Emote),
    Invite(Invite),
}

impl ArgumentValue {
    /// Short label of the variant, used in usage text and logs.
    pub fn type_label(&self) -> &'static str {
        match self {
            ArgumentValue::Str(_) => "string",
            ArgumentValue::Num(_) => "number",
            ArgumentValue::Bool(_) => "boolean",
            ArgumentValue::Date(_) => "date",
            ArgumentValue::Duration(_) => "duration",
            ArgumentValue::Regex(_) => "regex",
            ArgumentValue::Json(_) => "json",
            ArgumentValue::Array(_) => "array",
            ArgumentValue::User(_) => "user",
            ArgumentValue::Member(_) => "member",
            ArgumentValue::Channel(_) => "channel",
            ArgumentValue::Role(_) => "role",
            ArgumentValue::Emote(_) => "emote",
            ArgumentValue::Invite(_) => "invite",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as an integer, if it has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < 9.0e15)
            .map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            ArgumentValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            ArgumentValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            ArgumentValue::Regex(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ArgumentValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ArgumentValue]> {
        match self {
            ArgumentValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The user behind a user or member value.
    pub fn as_user(&self) -> Option<&User> {
        match self {
            ArgumentValue::User(u) => Some(u),
            ArgumentValue::Member(m) => Some(&m.user),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            ArgumentValue::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            ArgumentValue::Channel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            ArgumentValue::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_emote(&self) -> Option<&Emote> {
        match self {
            ArgumentValue::Emote(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_invite(&self) -> Option<&Invite> {
        match self {
            ArgumentValue::Invite(i) => Some(i),
            _ => None,
        }
    }
}

/// Textual form that the matching resolver parses back to an equal value.
impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Str(s) => f.write_str(s),
            ArgumentValue::Num(n) => write!(f, "{}", n),
            ArgumentValue::Bool(b) => write!(f, "{}", b),
            ArgumentValue::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            ArgumentValue::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
            ArgumentValue::Regex(p) => write!(f, "{}", p),
            ArgumentValue::Json(v) => write!(f, "{}", v),
            ArgumentValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                f.write_str(&parts.join(","))
            }
            ArgumentValue::User(u) => write!(f, "<@{}>", u.id),
            ArgumentValue::Member(m) => write!(f, "<@{}>", m.user.id),
            ArgumentValue::Channel(c) => write!(f, "<#{}>", c.id),
            ArgumentValue::Role(r) => write!(f, "<@&{}>", r.id),
            ArgumentValue::Emote(e) if e.animated => write!(f, "<a:{}:{}>", e.name, e.id),
            ArgumentValue::Emote(e) => write!(f, "<:{}:{}>", e.name, e.id),
            ArgumentValue::Invite(i) => f.write_str(&i.code),
        }
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::Str(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::Str(value)
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        ArgumentValue::Num(value)
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Num(value as f64)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for ArgumentValue {
    fn from(value: DateTime<Utc>) -> Self {
        ArgumentValue::Date(value)
    }
}

impl From<Duration> for ArgumentValue {
    fn from(value: Duration) -> Self {
        ArgumentValue::Duration(value)
    }
}

impl From<serde_json::Value> for ArgumentValue {
    fn from(value: serde_json::Value) -> Self {
        ArgumentValue::Json(value)
    }
}
