//! Resolver trait and the context it runs in.

use crate::error::TypeResolverError;
use crate::value::ArgumentValue;
use async_trait::async_trait;
use chat_platform::{Message, Platform};

/// Invocation context handed to every resolver.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub message: &'a Message,
    pub platform: &'a dyn Platform,
}

impl<'a> ResolveContext<'a> {
    pub fn new(message: &'a Message, platform: &'a dyn Platform) -> Self {
        Self { message, platform }
    }
}

/// Converts raw argument text into a typed value.
#[async_trait]
pub trait TypeResolver: Send + Sync {
    /// Type name used in argument declarations (e.g. "number").
    fn name(&self) -> &str;

    /// Example literals shown when a cast fails.
    fn expected(&self) -> Vec<String>;

    /// Whether `value` already has this resolver's output type.
    fn accepts(&self, value: &ArgumentValue) -> bool;

    /// Cast `raw` without touching the platform, so declarations can be
    /// checked at registration. `None` when the type needs a lookup.
    fn resolve_offline(&self, _raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        None
    }

    /// Cast `raw` into this resolver's type.
    async fn resolve(
        &self,
        raw: &str,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError>;
}
