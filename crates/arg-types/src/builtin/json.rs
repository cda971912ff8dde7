//! JSON document type.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use async_trait::async_trait;

pub struct JsonResolver;

#[async_trait]
impl TypeResolver for JsonResolver {
    fn name(&self) -> &str {
        "json"
    }

    fn expected(&self) -> Vec<String> {
        vec![r#"{"key": "value"}"#.into(), "[1, 2, 3]".into()]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Json(_))
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        Some(self.parse(raw))
    }

    async fn resolve(
        &self,
        raw: &str,
        _ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        self.parse(raw)
    }
}

impl JsonResolver {
    fn parse(&self, raw: &str) -> Result<ArgumentValue, TypeResolverError> {
        serde_json::from_str(raw).map(ArgumentValue::Json).map_err(|e| {
            TypeResolverError::malformed(format!("Invalid JSON: {}", e), self.expected(), raw)
        })
    }
}
