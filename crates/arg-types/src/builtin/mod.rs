//! Built-in argument types.

mod array;
mod entity;
mod json;
mod pattern;
mod primitive;
mod time;

pub use array::ArrayResolver;
pub use entity::EntityResolver;
pub use json::JsonResolver;
pub use pattern::RegexResolver;
pub use primitive::{parse_bool_token, BooleanResolver, NumberResolver, StringResolver};
pub use time::{DateResolver, DurationResolver};

use crate::types::TypeResolver;
use chat_platform::EntityKind;
use std::sync::Arc;

/// Every built-in resolver, including the plain `array` type.
pub fn all() -> Vec<Arc<dyn TypeResolver>> {
    let string: Arc<dyn TypeResolver> = Arc::new(StringResolver);
    vec![
        string.clone(),
        Arc::new(NumberResolver),
        Arc::new(BooleanResolver),
        Arc::new(DateResolver),
        Arc::new(DurationResolver),
        Arc::new(RegexResolver),
        Arc::new(JsonResolver),
        Arc::new(ArrayResolver::new("array", string)),
        Arc::new(EntityResolver::new(EntityKind::User)),
        Arc::new(EntityResolver::new(EntityKind::Member)),
        Arc::new(EntityResolver::new(EntityKind::Channel)),
        Arc::new(EntityResolver::new(EntityKind::Role)),
        Arc::new(EntityResolver::new(EntityKind::Emote)),
        Arc::new(EntityResolver::new(EntityKind::Invite)),
    ]
}
