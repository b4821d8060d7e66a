//! # Loading Contexts
//!
//! Where a type's code comes from.
//!
//! A [`LoadingContext`] is a registry handed in by the caller instead of the
//! engine's default namespace. A [`BundleCatalog`] turns the code location
//! strings found in specifications into contexts: each location is bound to a
//! factory closure at startup, and every load runs that closure again, so a
//! context is never shared between two loads.

use crate::registry::TypeRegistry;
use crate::types::{ConstructionError, TypeDescriptor};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A caller-supplied namespace to resolve type names in.
#[derive(Debug, Clone)]
pub struct LoadingContext {
    location: Option<String>,
    registry: Arc<TypeRegistry>,
}

impl LoadingContext {
    /// Wrap a registry.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            location: None,
            registry,
        }
    }

    /// Wrap a registry loaded from `location`.
    #[must_use]
    pub fn at(location: impl Into<String>, registry: Arc<TypeRegistry>) -> Self {
        Self {
            location: Some(location.into()),
            registry,
        }
    }

    /// The code location this context was loaded from, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The registry behind this context.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Resolve a non-alias type name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        self.registry.resolve(name)
    }
}

type BundleFactory = dyn Fn() -> TypeRegistry + Send + Sync;

/// Code bundles known to an engine, keyed by location.
#[derive(Clone, Default)]
pub struct BundleCatalog {
    bundles: BTreeMap<String, Arc<BundleFactory>>,
}

impl BundleCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `location` to a registry factory.
    pub fn register<F>(&mut self, location: impl Into<String>, factory: F)
    where
        F: Fn() -> TypeRegistry + Send + Sync + 'static,
    {
        self.bundles.insert(location.into(), Arc::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, location: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> TypeRegistry + Send + Sync + 'static,
    {
        self.register(location, factory);
        self
    }

    /// Whether `location` is known.
    #[must_use]
    pub fn contains(&self, location: &str) -> bool {
        self.bundles.contains_key(location)
    }

    /// Known locations.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    /// Build a fresh context for `location`.
    ///
    /// Classes the bundle does not define are looked up in `parent`, the
    /// engine's default namespace.
    pub fn load(
        &self,
        location: &str,
        parent: &Arc<TypeRegistry>,
    ) -> Result<LoadingContext, ConstructionError> {
        let factory = self
            .bundles
            .get(location)
            .ok_or_else(|| ConstructionError::BundleUnavailable(location.to_string()))?;

        let mut registry = TypeRegistry::with_parent(Arc::clone(parent));
        let bundle = factory();
        for name in bundle.class_names() {
            if let Some(class) = bundle.class(name) {
                registry.register(class);
            }
        }

        tracing::debug!(location, classes = registry.len(), "loaded code bundle");
        Ok(LoadingContext::at(location, Arc::new(registry)))
    }
}

impl fmt::Debug for BundleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleCatalog")
            .field("locations", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
