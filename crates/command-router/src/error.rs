//! Command runtime errors.

use arg_types::TypeResolverError;
use thiserror::Error;

/// Problems in command declarations, detected when a command is added.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Command name '{0}' must be non-empty and contain no whitespace")]
    InvalidName(String),

    #[error("Command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("Alias '{alias}' of command '{command}' collides with command '{existing}'")]
    AliasCollision {
        alias: String,
        command: String,
        existing: String,
    },

    #[error("Command '{command}' cannot be the default command, '{existing}' already is")]
    DuplicateDefault { command: String, existing: String },

    #[error("Sub-command '{0}' cannot be marked as the default command")]
    NestedDefault(String),

    #[error("Short form '{short}' of argument '{argument}' in command '{command}' must be exactly one character")]
    InvalidShort {
        command: String,
        argument: String,
        short: String,
    },

    #[error("Argument '{argument}' in command '{command}' cannot have a short form")]
    ShortNotAllowed { command: String, argument: String },

    #[error("Argument '{argument}' in command '{command}' uses unknown type '{type_name}'")]
    UnknownType {
        command: String,
        argument: String,
        type_name: String,
    },

    #[error("Argument '{argument}' in command '{command}' declares both required and default")]
    RequiredWithDefault { command: String, argument: String },

    #[error("Argument name '{argument}' is used twice in command '{command}'")]
    DuplicateArgument { command: String, argument: String },

    #[error("Command '{command}' declares rest argument '{argument}' after another rest argument")]
    DuplicateRest { command: String, argument: String },

    #[error("Default of argument '{argument}' in command '{command}' is not a valid value: {reason}")]
    InvalidDefault {
        command: String,
        argument: String,
        reason: String,
    },

    #[error("Argument key '{argument}' in command '{command}' is reserved for help")]
    ReservedArgument { command: String, argument: String },

    #[error("Command '{0}' declares a zero-length cooldown")]
    InvalidCooldown(String),
}

/// First failing argument of a resolution. The message is user-facing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("{message}")]
    Missing { argument: String, message: String },

    #[error("{message}")]
    BadType {
        argument: String,
        /// Name, alias or short form the value was supplied under.
        used_name: String,
        cause: TypeResolverError,
        message: String,
    },

    #[error("{message}")]
    BadValue {
        argument: String,
        used_name: String,
        message: String,
    },
}

impl ArgumentError {
    /// Declared name of the failing argument.
    pub fn argument(&self) -> &str {
        match self {
            ArgumentError::Missing { argument, .. }
            | ArgumentError::BadType { argument, .. }
            | ArgumentError::BadValue { argument, .. } => argument,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ArgumentError::Missing { .. })
    }
}
