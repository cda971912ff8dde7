//! Registry of argument types.

use crate::builtin::{self, ArrayResolver};
use crate::error::{TypeRegistryError, TypeResolverError};
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const ARRAY_SUFFIX: &str = "[]";

/// Registry of type resolvers, looked up by declared type name.
///
/// Every registered type `t` also answers to `t[]`, a comma-separated list
/// of `t` values.
pub struct TypeRegistry {
    resolvers: HashMap<String, Arc<dyn TypeResolver>>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for resolver in builtin::all() {
            let name = resolver.name().to_string();
            registry.resolvers.insert(name, resolver);
        }
        registry
    }

    /// Register a resolver. Names are never reused.
    pub fn register(&mut self, resolver: Arc<dyn TypeResolver>) -> Result<(), TypeRegistryError> {
        let name = resolver.name().to_string();
        if name.ends_with(ARRAY_SUFFIX) {
            return Err(TypeRegistryError::ReservedName(name));
        }
        if self.resolvers.contains_key(&name) {
            return Err(TypeRegistryError::Duplicate(name));
        }
        debug!(type_name = %name, "Registered argument type");
        self.resolvers.insert(name, resolver);
        Ok(())
    }

    /// Get a resolver by name, including `[]` array variants.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TypeResolver>> {
        if let Some(resolver) = self.resolvers.get(name) {
            return Some(resolver.clone());
        }
        let base = name.strip_suffix(ARRAY_SUFFIX)?;
        let item = self.resolvers.get(base)?.clone();
        Some(Arc::new(ArrayResolver::new(name, item)))
    }

    /// Check if a type name can be resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List registered base type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Cast `raw` with the resolver registered as `name`.
    pub async fn resolve(
        &self,
        name: &str,
        raw: &str,
        ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        match self.get(name) {
            Some(resolver) => resolver.resolve(raw, ctx).await,
            None => Err(TypeResolverError::unknown_type(name, raw)),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
