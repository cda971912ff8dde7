//! Comma-separated list types.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use async_trait::async_trait;
use std::sync::Arc;

/// List of values of one item type, written as `a,b,c`.
pub struct ArrayResolver {
    name: String,
    item: Arc<dyn TypeResolver>,
}

impl ArrayResolver {
    pub fn new(name: impl Into<String>, item: Arc<dyn TypeResolver>) -> Self {
        Self {
            name: name.into(),
            item,
        }
    }

    fn item_error(&self, index: usize, cause: TypeResolverError, raw: &str) -> TypeResolverError {
        TypeResolverError {
            message: format!("Item #{} of the list: {}", index + 1, cause.message),
            expected: self.expected(),
            provided: raw.to_string(),
            kind: cause.kind,
        }
    }
}

fn items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|p| !p.is_empty())
}

#[async_trait]
impl TypeResolver for ArrayResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected(&self) -> Vec<String> {
        let examples = self.item.expected();
        let mut pair = examples.iter().take(2).cloned().collect::<Vec<_>>();
        if pair.len() == 1 {
            pair.push(pair[0].clone());
        }
        vec![pair.join(",")]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        value
            .as_array()
            .map(|items| items.iter().all(|i| self.item.accepts(i)))
            .unwrap_or(false)
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        let mut values = Vec::new();
        for (index, part) in items(raw).enumerate() {
            match self.item.resolve_offline(part)? {
                Ok(value) => values.push(value),
                Err(e) => return Some(Err(self.item_error(index, e, raw))),
            }
        }
        Some(Ok(ArgumentValue::Array(values)))
    }

    async fn resolve(
        &self,
        raw: &str,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        let mut values = Vec::new();
        for (index, part) in items(raw).enumerate() {
            match self.item.resolve(part, ctx).await {
                Ok(value) => values.push(value),
                Err(e) => return Err(self.item_error(index, e, raw)),
            }
        }

        Ok(ArgumentValue::Array(values))
    }
}
