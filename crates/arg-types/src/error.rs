//! Type resolution errors.

use thiserror::Error;

/// Why a raw value could not be turned into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// The raw text does not have the expected shape.
    Malformed,
    /// The raw text is well formed but names nothing the platform knows.
    NotFound,
    /// No resolver is registered under the requested type name.
    UnknownType,
}

/// Failure of a single type cast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TypeResolverError {
    pub kind: TypeErrorKind,
    pub message: String,
    /// Example literals the resolver accepts.
    pub expected: Vec<String>,
    pub provided: String,
}

impl TypeResolverError {
    pub fn malformed(
        message: impl Into<String>,
        expected: Vec<String>,
        provided: impl Into<String>,
    ) -> Self {
        Self {
            kind: TypeErrorKind::Malformed,
            message: message.into(),
            expected,
            provided: provided.into(),
        }
    }

    pub fn not_found(
        message: impl Into<String>,
        expected: Vec<String>,
        provided: impl Into<String>,
    ) -> Self {
        Self {
            kind: TypeErrorKind::NotFound,
            message: message.into(),
            expected,
            provided: provided.into(),
        }
    }

    pub fn unknown_type(name: &str, provided: impl Into<String>) -> Self {
        Self {
            kind: TypeErrorKind::UnknownType,
            message: format!("Unknown argument type '{}'", name),
            expected: Vec::new(),
            provided: provided.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == TypeErrorKind::NotFound
    }

    /// Multi-line description shown to users.
    pub fn describe(&self) -> String {
        let mut out = self.message.clone();
        if !self.expected.is_empty() {
            let expected: Vec<String> = self.expected.iter().map(|e| format!("`{}`", e)).collect();
            out.push_str(&format!("\nExpected: {}", expected.join(", ")));
        }
        out.push_str(&format!("\nProvided: `{}`", self.provided));
        out
    }
}

/// Errors raised while building a type registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeRegistryError {
    #[error("Type '{0}' is already registered")]
    Duplicate(String),

    #[error("Type name '{0}' is reserved for array variants")]
    ReservedName(String),
}
