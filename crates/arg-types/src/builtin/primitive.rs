//! String, number and boolean types.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use async_trait::async_trait;

const TRUTHY: &[&str] = &["true", "yes", "y", "on", "1"];
const FALSY: &[&str] = &["false", "no", "n", "off", "0"];

/// Parse a yes/no token, case-insensitive.
pub fn parse_bool_token(token: &str) -> Option<bool> {
    let token = token.trim().to_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        Some(true)
    } else if FALSY.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub struct StringResolver;

#[async_trait]
impl TypeResolver for StringResolver {
    fn name(&self) -> &str {
        "string"
    }

    fn expected(&self) -> Vec<String> {
        vec!["text".into(), "\"quoted text\"".into()]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Str(_))
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        Some(Ok(ArgumentValue::Str(raw.to_string())))
    }

    async fn resolve(
        &self,
        raw: &str,
        _ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        Ok(ArgumentValue::Str(raw.to_string()))
    }
}

pub struct NumberResolver;

#[async_trait]
impl TypeResolver for NumberResolver {
    fn name(&self) -> &str {
        "number"
    }

    fn expected(&self) -> Vec<String> {
        vec!["42".into(), "-4.5".into(), "1_000_000".into()]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Num(_))
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

impl NumberResolver {
    fn parse(&self, raw: &str) -> Result<ArgumentValue, TypeResolverError> {
        let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();

        // f64 parsing also takes "inf" and "NaN"; neither is a usable argument.
        match cleaned.parse::<f64>() {
            Ok(n) if n.is_finite() && !cleaned.is_empty() => Ok(ArgumentValue::Num(n)),
            _ => Err(TypeResolverError::malformed(
                "Invalid number",
                self.expected(),
                raw,
            )),
        }
    }
}

pub struct BooleanResolver;

#[async_trait]
impl TypeResolver for BooleanResolver {
    fn name(&self) -> &str {
        "boolean"
    }

    fn expected(&self) -> Vec<String> {
        TRUTHY.iter().chain(FALSY).map(|s| s.to_string()).collect()
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Bool(_))
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

impl BooleanResolver {
    fn parse(&self, raw: &str) -> Result<ArgumentValue, TypeResolverError> {
        parse_bool_token(raw)
            .map(ArgumentValue::Bool)
            .ok_or_else(|| TypeResolverError::malformed("Invalid boolean", self.expected(), raw))
    }
}
