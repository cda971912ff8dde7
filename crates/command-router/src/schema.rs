//! Declarative argument schema.

use crate::error::ConfigError;
use arg_types::{ArgumentValue, TypeRegistry};
use chat_platform::Message;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

type MessageFn<T> = Arc<dyn Fn(&Message) -> T + Send + Sync>;

/// Type that flag values are cast with.
pub(crate) const FLAG_TYPE: &str = "boolean";

/// `--help` and `-h` always ask for usage, so no argument may answer to them.
const RESERVED_KEYS: &[&str] = &["help", "h"];

/// A constant or a function of the invocation message, evaluated lazily.
pub enum Scrap<T> {
    Value(T),
    Lazy(MessageFn<T>),
}

impl<T: Clone> Scrap<T> {
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn(&Message) -> T + Send + Sync + 'static,
    {
        Scrap::Lazy(Arc::new(f))
    }

    pub fn get(&self, message: &Message) -> T {
        match self {
            Scrap::Value(v) => v.clone(),
            Scrap::Lazy(f) => f(message),
        }
    }

    /// The constant, if this is not lazy.
    pub fn constant(&self) -> Option<&T> {
        match self {
            Scrap::Value(v) => Some(v),
            Scrap::Lazy(_) => None,
        }
    }
}

impl<T: Clone> Clone for Scrap<T> {
    fn clone(&self) -> Self {
        match self {
            Scrap::Value(v) => Scrap::Value(v.clone()),
            Scrap::Lazy(f) => Scrap::Lazy(f.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scrap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scrap::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Scrap::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl<T> From<T> for Scrap<T> {
    fn from(value: T) -> Self {
        Scrap::Value(value)
    }
}

/// Outcome of a custom validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Pass,
    Fail,
    /// Failure with a user-facing reason, shown verbatim.
    Reason(String),
}

impl From<bool> for Validation {
    fn from(ok: bool) -> Self {
        if ok {
            Validation::Pass
        } else {
            Validation::Fail
        }
    }
}

impl From<String> for Validation {
    fn from(reason: String) -> Self {
        Validation::Reason(reason)
    }
}

impl From<&str> for Validation {
    fn from(reason: &str) -> Self {
        Validation::Reason(reason.to_string())
    }
}

impl From<Result<(), String>> for Validation {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Validation::Pass,
            Err(reason) => Validation::Reason(reason),
        }
    }
}

type CheckFn = Arc<dyn Fn(&ArgumentValue, &Message) -> Validation + Send + Sync>;

/// Custom check run on a casted argument value.
#[derive(Clone)]
pub struct Validator {
    label: String,
    check: CheckFn,
}

impl Validator {
    /// Wrap a check; its Rust type name labels failures that carry no reason.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&ArgumentValue, &Message) -> R + Send + Sync + 'static,
        R: Into<Validation>,
    {
        Self::described(std::any::type_name::<F>(), f)
    }

    /// Wrap a check with a human-readable label.
    pub fn described<F, R>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ArgumentValue, &Message) -> R + Send + Sync + 'static,
        R: Into<Validation>,
    {
        Self {
            label: label.into(),
            check: Arc::new(move |value, message| f(value, message).into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, value: &ArgumentValue, message: &Message) -> Validation {
        (self.check)(value, message)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("label", &self.label).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Positional,
    Option,
    Flag,
    /// Trailing text. With `all`, the untouched message tail.
    Rest { all: bool },
}

impl ArgumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArgumentKind::Positional => "positional",
            ArgumentKind::Option => "option",
            ArgumentKind::Flag => "flag",
            ArgumentKind::Rest { .. } => "rest",
        }
    }
}

/// One declared argument of a command.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub name: String,
    pub kind: ArgumentKind,
    /// Type name looked up in the type registry. `None` for flags.
    pub type_name: Option<String>,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    /// Single-letter form, options and flags only.
    pub short: Option<String>,
    pub required: Option<Scrap<bool>>,
    pub default: Option<Scrap<ArgumentValue>>,
    pub validator: Option<Validator>,
    pub missing_error_message: Option<String>,
    /// Template for cast failures; `@error` is replaced by the cast error.
    pub type_error_message: Option<String>,
    pub validation_error_message: Option<String>,
}

impl ArgumentSpec {
    fn new(name: impl Into<String>, kind: ArgumentKind, type_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name,
            description: None,
            aliases: Vec::new(),
            short: None,
            required: None,
            default: None,
            validator: None,
            missing_error_message: None,
            type_error_message: None,
            validation_error_message: None,
        }
    }

    pub fn positional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::Positional, Some(type_name.into()))
    }

    pub fn option(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::Option, Some(type_name.into()))
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::Flag, None)
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::Rest { all: false }, Some("string".into()))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(Scrap::Value(true));
        self
    }

    /// Required depending on the invocation message.
    pub fn required_if<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.required = Some(Scrap::lazy(f));
        self
    }

    pub fn default_value(mut self, value: impl Into<ArgumentValue>) -> Self {
        self.default = Some(Scrap::Value(value.into()));
        self
    }

    /// Default computed from the invocation message when the argument is omitted.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message) -> ArgumentValue + Send + Sync + 'static,
    {
        self.default = Some(Scrap::lazy(f));
        self
    }

    pub fn validate<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&ArgumentValue, &Message) -> R + Send + Sync + 'static,
        R: Into<Validation>,
    {
        self.validator = Some(Validator::new(f));
        self
    }

    pub fn validate_described<F, R>(mut self, label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ArgumentValue, &Message) -> R + Send + Sync + 'static,
        R: Into<Validation>,
    {
        self.validator = Some(Validator::described(label, f));
        self
    }

    pub fn missing_error_message(mut self, message: impl Into<String>) -> Self {
        self.missing_error_message = Some(message.into());
        self
    }

    pub fn type_error_message(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    pub fn validation_error_message(mut self, message: impl Into<String>) -> Self {
        self.validation_error_message = Some(message.into());
        self
    }

    /// Make a rest argument capture the untouched message tail.
    pub fn all(mut self) -> Self {
        if let ArgumentKind::Rest { .. } = self.kind {
            self.kind = ArgumentKind::Rest { all: true };
        }
        self
    }

    pub fn is_required(&self, message: &Message) -> bool {
        self.required
            .as_ref()
            .map(|r| r.get(message))
            .unwrap_or(false)
    }

    /// Whether `key` (without dashes) designates this argument.
    pub fn answers_to(&self, key: &str) -> bool {
        self.name == key
            || self.aliases.iter().any(|a| a == key)
            || self.short.as_deref() == Some(key)
    }

    /// Lookup keys in priority order: name, aliases, then short form.
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(|a| a.as_str()))
            .chain(self.short.as_deref())
    }
}

/// All arguments of a command, grouped by kind in resolution order.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSchema {
    pub positional: Vec<ArgumentSpec>,
    pub options: Vec<ArgumentSpec>,
    pub flags: Vec<ArgumentSpec>,
    pub rest: Option<ArgumentSpec>,
    /// Names of rest arguments declared after the first one.
    extra_rest: Vec<String>,
}

impl ArgumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument to the group matching its kind. Only the first rest is
    /// kept; later ones fail validation.
    pub fn push(&mut self, spec: ArgumentSpec) {
        match spec.kind {
            ArgumentKind::Positional => self.positional.push(spec),
            ArgumentKind::Option => self.options.push(spec),
            ArgumentKind::Flag => self.flags.push(spec),
            ArgumentKind::Rest { .. } if self.rest.is_some() => self.extra_rest.push(spec.name),
            ArgumentKind::Rest { .. } => self.rest = Some(spec),
        }
    }

    pub fn with(mut self, spec: ArgumentSpec) -> Self {
        self.push(spec);
        self
    }

    /// Every argument in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.positional
            .iter()
            .chain(&self.options)
            .chain(&self.flags)
            .chain(self.rest.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The flag designated by `key`, if any.
    pub fn flag(&self, key: &str) -> Option<&ArgumentSpec> {
        self.flags.iter().find(|f| f.answers_to(key))
    }

    /// Structural checks run when the owning command is registered.
    pub fn validate(&self, command: &str, types: &TypeRegistry) -> Result<(), ConfigError> {
        if let Some(argument) = self.extra_rest.first() {
            return Err(ConfigError::DuplicateRest {
                command: command.into(),
                argument: argument.clone(),
            });
        }

        let mut keys = HashSet::new();

        for spec in self.iter() {
            for key in spec.lookup_keys() {
                if RESERVED_KEYS.contains(&key) {
                    return Err(ConfigError::ReservedArgument {
                        command: command.into(),
                        argument: key.into(),
                    });
                }
                if !keys.insert(key.to_string()) {
                    return Err(ConfigError::DuplicateArgument {
                        command: command.into(),
                        argument: key.into(),
                    });
                }
            }

            if let Some(short) = &spec.short {
                if matches!(spec.kind, ArgumentKind::Positional | ArgumentKind::Rest { .. }) {
                    return Err(ConfigError::ShortNotAllowed {
                        command: command.into(),
                        argument: spec.name.clone(),
                    });
                }
                if short.chars().count() != 1 {
                    return Err(ConfigError::InvalidShort {
                        command: command.into(),
                        argument: spec.name.clone(),
                        short: short.clone(),
                    });
                }
            }

            if spec.required.is_some() && spec.default.is_some() {
                return Err(ConfigError::RequiredWithDefault {
                    command: command.into(),
                    argument: spec.name.clone(),
                });
            }

            if let Some(type_name) = &spec.type_name {
                if !types.contains(type_name) {
                    return Err(ConfigError::UnknownType {
                        command: command.into(),
                        argument: spec.name.clone(),
                        type_name: type_name.clone(),
                    });
                }
            }

            check_constant_default(spec, command, types)?;
        }

        Ok(())
    }
}

/// A constant default must cast to the declared type. Types that need a
/// platform lookup are checked on use instead.
fn check_constant_default(spec: &ArgumentSpec, command: &str, types: &TypeRegistry) -> Result<(), ConfigError> {
    let Some(value) = spec.default.as_ref().and_then(Scrap::constant) else {
        return Ok(());
    };
    let Some(resolver) = types.get(spec.type_name.as_deref().unwrap_or(FLAG_TYPE)) else {
        return Ok(());
    };
    if resolver.accepts(value) {
        return Ok(());
    }

    match resolver.resolve_offline(&value.to_string()) {
        Some(Err(cause)) => Err(ConfigError::InvalidDefault {
            command: command.into(),
            argument: spec.name.clone(),
            reason: cause.message,
        }),
        _ => Ok(()),
    }
}
