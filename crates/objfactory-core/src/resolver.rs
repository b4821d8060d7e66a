//! # Type Resolver
//!
//! Type name + optional loading context → [`TypeDescriptor`].
//!
//! Simple aliases (`int`, `string`, ...) resolve without looking at any
//! registry. Everything else is looked up in the supplied context, or in the
//! engine's default registry when there is none.

use crate::loading::LoadingContext;
use crate::primitives::STRING;
use crate::registry::TypeRegistry;
use crate::types::{ConstructionError, Primitive, TypeDescriptor};
use std::sync::Arc;

/// Resolves type names against a default registry.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    registry: Arc<TypeRegistry>,
}

impl TypeResolver {
    /// Create a resolver over the default namespace.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// The default namespace.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Resolve `name`, preferring `context` over the default registry.
    pub fn resolve(
        &self,
        name: &str,
        context: Option<&LoadingContext>,
    ) -> Result<TypeDescriptor, ConstructionError> {
        if let Some(alias) = Self::alias(name) {
            return Ok(alias);
        }
        let found = match context {
            Some(ctx) => ctx.resolve(name),
            None => self.registry.resolve(name),
        };
        found.ok_or_else(|| ConstructionError::TypeNotFound(name.to_string()))
    }

    /// The type a simple alias stands for.
    ///
    /// Only the short string alias is handled here; the full string name is
    /// a registry built-in.
    #[must_use]
    pub fn alias(name: &str) -> Option<TypeDescriptor> {
        if name == STRING {
            return Some(TypeDescriptor::String);
        }
        Primitive::from_alias(name).map(TypeDescriptor::Primitive)
    }
}

// =============================================================================
// TESTS
// =============================================================================
