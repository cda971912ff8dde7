//! Regex literal type: `/pattern/flags`.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::{ArgumentValue, Pattern};
use async_trait::async_trait;
use regex::RegexBuilder;

/// Flags accepted after the closing slash. `g` and `u` are kept but have no effect.
const KNOWN_FLAGS: &str = "gimsuxU";

pub struct RegexResolver;

impl RegexResolver {
    fn parse(&self, raw: &str) -> Result<Pattern, TypeResolverError> {
        let raw_trimmed = raw.trim();
        let body = raw_trimmed
            .strip_prefix('/')
            .ok_or_else(|| self.error("Regex must start with '/'", raw))?;
        let close = body
            .rfind('/')
            .ok_or_else(|| self.error("Regex must end with '/' followed by optional flags", raw))?;
        let (source, flags) = (&body[..close], &body[close + 1..]);

        if let Some(bad) = flags.chars().find(|c| !KNOWN_FLAGS.contains(*c)) {
            return Err(self.error(&format!("Unknown regex flag '{}'", bad), raw));
        }

        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .swap_greed(flags.contains('U'))
            .build()
            .map_err(|e| self.error(&format!("Invalid regex: {}", e), raw))?;

        Ok(Pattern {
            regex,
            flags: flags.to_string(),
        })
    }

    fn error(&self, message: &str, raw: &str) -> TypeResolverError {
        TypeResolverError::malformed(message, self.expected(), raw)
    }
}

#[async_trait]
impl TypeResolver for RegexResolver {
    fn name(&self) -> &str {
        "regex"
    }

    fn expected(&self) -> Vec<String> {
        vec!["/pattern/".into(), "/^hello$/i".into()]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Regex(_))
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        Some(self.parse(raw).map(ArgumentValue::Regex))
    }

    async fn resolve(
        &self,
        raw: &str,
        _ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        self.parse(raw).map(ArgumentValue::Regex)
    }
}
