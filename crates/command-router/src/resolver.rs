//! Argument resolution: locate, default, cast, validate.

use crate::bag::ArgumentBag;
use crate::error::ArgumentError;
use crate::schema::{ArgumentKind, ArgumentSchema, ArgumentSpec, Validation, FLAG_TYPE};
use crate::tokens::{ParsedTokens, RawValue};
use arg_types::{parse_bool_token, ArgumentValue, ResolveContext, TypeRegistry, TypeResolverError};
use tracing::debug;

/// A raw value and the key it was supplied under.
struct Located {
    used: String,
    raw: RawValue,
}

/// Turns parsed tokens into a typed [`ArgumentBag`] for one schema.
pub struct ArgumentResolver<'a> {
    types: &'a TypeRegistry,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self { types }
    }

    /// Resolve every argument in order positional, options, flags, rest.
    /// Stops at the first failure.
    pub async fn resolve(
        &self,
        schema: &ArgumentSchema,
        mut tokens: ParsedTokens,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentBag, ArgumentError> {
        let mut bag = ArgumentBag::new();

        for spec in &schema.positional {
            let located = take_named(spec, &mut tokens).or_else(|| {
                tokens.positional.pop_front().map(|text| Located {
                    used: spec.name.clone(),
                    raw: RawValue::Text(text),
                })
            });
            bag = self.resolve_one(spec, located, ctx, bag).await?;
        }

        for spec in &schema.options {
            let located = take_named(spec, &mut tokens);
            bag = self.resolve_one(spec, located, ctx, bag).await?;
        }

        for spec in &schema.flags {
            let located = take_named(spec, &mut tokens).map(|l| coerce_flag(l, &mut tokens));
            bag = self.resolve_one(spec, located, ctx, bag).await?;
        }

        if let Some(spec) = &schema.rest {
            let located = take_named(spec, &mut tokens).or_else(|| take_rest(spec, &mut tokens));
            bag = self.resolve_one(spec, located, ctx, bag).await?;
        }

        Ok(bag)
    }

    async fn resolve_one(
        &self,
        spec: &ArgumentSpec,
        located: Option<Located>,
        ctx: &ResolveContext<'_>,
        mut bag: ArgumentBag,
    ) -> Result<ArgumentBag, ArgumentError> {
        let value = match located {
            Some(Located { used, raw }) => {
                let value = self.cast(spec, &used, raw, ctx).await?;
                validate(spec, &used, &value, ctx)?;
                Some(value)
            }
            None if spec.is_required(ctx.message) => return Err(missing(spec)),
            None => match &spec.default {
                Some(default) => {
                    let value = default.get(ctx.message);
                    Some(self.cast(spec, &spec.name, RawValue::Typed(value), ctx).await?)
                }
                None if spec.kind == ArgumentKind::Flag => Some(ArgumentValue::Bool(false)),
                None => None,
            },
        };

        debug!(argument = %spec.name, present = value.is_some(), "Resolved argument");
        bag.insert(spec.name.clone(), value);
        Ok(bag)
    }

    async fn cast(
        &self,
        spec: &ArgumentSpec,
        used: &str,
        raw: RawValue,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, ArgumentError> {
        let type_name = spec.type_name.as_deref().unwrap_or(FLAG_TYPE);
        let Some(resolver) = self.types.get(type_name) else {
            let text = match &raw {
                RawValue::Text(t) => t.clone(),
                RawValue::Bool(b) => b.to_string(),
                RawValue::Typed(v) => v.to_string(),
            };
            return Err(bad_type(spec, used, TypeResolverError::unknown_type(type_name, text)));
        };

        let result = match raw {
            RawValue::Typed(value) if resolver.accepts(&value) => Ok(value),
            RawValue::Typed(value) => resolver.resolve(&value.to_string(), ctx).await,
            RawValue::Bool(b) => resolver.resolve(&b.to_string(), ctx).await,
            RawValue::Text(text) => resolver.resolve(&text, ctx).await,
        };
        result.map_err(|cause| bad_type(spec, used, cause))
    }
}

fn take_named(spec: &ArgumentSpec, tokens: &mut ParsedTokens) -> Option<Located> {
    let keys: Vec<String> = spec.lookup_keys().map(str::to_string).collect();
    keys.into_iter().find_map(|key| {
        tokens.take_named(&key).map(|raw| Located { used: key, raw })
    })
}

/// A flag given a word that is not yes/no is set, and the word goes back
/// to the front of the positional stream.
fn coerce_flag(located: Located, tokens: &mut ParsedTokens) -> Located {
    let raw = match located.raw {
        RawValue::Text(text) => match parse_bool_token(&text) {
            Some(b) => RawValue::Bool(b),
            None => {
                tokens.positional.push_front(text);
                RawValue::Bool(true)
            }
        },
        RawValue::Typed(ArgumentValue::Str(text)) => {
            return coerce_flag(
                Located {
                    used: located.used,
                    raw: RawValue::Text(text),
                },
                tokens,
            )
        }
        other => other,
    };
    Located {
        used: located.used,
        raw,
    }
}

fn take_rest(spec: &ArgumentSpec, tokens: &mut ParsedTokens) -> Option<Located> {
    let text = match spec.kind {
        ArgumentKind::Rest { all: true } => tokens.tail.trim().to_string(),
        _ => tokens.positional.drain(..).collect::<Vec<_>>().join(" "),
    };
    (!text.is_empty()).then(|| Located {
        used: spec.name.clone(),
        raw: RawValue::Text(text),
    })
}

fn missing(spec: &ArgumentSpec) -> ArgumentError {
    let message = spec.missing_error_message.clone().unwrap_or_else(|| {
        let mut message = format!("Missing {} argument `{}`", spec.kind.label(), spec.name);
        if let Some(description) = &spec.description {
            message.push_str(&format!(" ({})", description));
        }
        message
    });
    ArgumentError::Missing {
        argument: spec.name.clone(),
        message,
    }
}

fn bad_type(spec: &ArgumentSpec, used: &str, cause: TypeResolverError) -> ArgumentError {
    let message = match &spec.type_error_message {
        Some(template) => template.replace("@error", &cause.message),
        None => format!(
            "Bad type for {} `{}`:\n{}",
            spec.kind.label(),
            used,
            cause.describe()
        ),
    };
    ArgumentError::BadType {
        argument: spec.name.clone(),
        used_name: used.to_string(),
        cause,
        message,
    }
}

fn validate(
    spec: &ArgumentSpec,
    used: &str,
    value: &ArgumentValue,
    ctx: &ResolveContext<'_>,
) -> Result<(), ArgumentError> {
    let Some(validator) = &spec.validator else {
        return Ok(());
    };
    let message = match validator.check(value, ctx.message) {
        Validation::Pass => return Ok(()),
        Validation::Reason(reason) => reason,
        Validation::Fail => spec.validation_error_message.clone().unwrap_or_else(|| {
            format!(
                "Bad value tested for {} `{}`: {}",
                spec.kind.label(),
                used,
                validator.label()
            )
        }),
    };
    Err(ArgumentError::BadValue {
        argument: spec.name.clone(),
        used_name: used.to_string(),
        message,
    })
}
