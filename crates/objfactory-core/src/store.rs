//! # Specification Stores
//!
//! Where build specifications come from.
//!
//! The engine only ever asks one question: "which specification is registered
//! under this key and identifier?". [`SpecificationStore`] is that seam.
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: specifications registered in code
//! - [`ConfigStore`](crate::formats::ConfigStore): specifications read from TOML

use crate::specification::BuildSpecification;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Why a store could not answer a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Nothing is registered under this key and identifier.
    #[error("Unknown reference: {}", reference_name(.key, .identifier.as_deref()))]
    UnknownReference {
        key: String,
        identifier: Option<String>,
    },

    /// The store failed for some other reason.
    #[error("Store failure: {0}")]
    Store(String),
}

impl LookupError {
    /// Build an unknown-reference error.
    pub fn unknown(key: &str, identifier: Option<&str>) -> Self {
        Self::UnknownReference {
            key: key.to_string(),
            identifier: identifier.map(str::to_string),
        }
    }

    /// Whether this is the "nothing registered" case.
    #[must_use]
    pub const fn is_unknown_reference(&self) -> bool {
        matches!(self, Self::UnknownReference { .. })
    }
}

/// Render a (key, identifier) pair the way it is written in a store.
pub fn reference_name(key: &str, identifier: Option<&str>) -> String {
    match identifier {
        Some(id) => format!("{key}{}{id}", crate::primitives::ID_DELIMITER),
        None => key.to_string(),
    }
}

/// Errors raised while building a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The source is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A specification refers to something that cannot be resolved.
    #[error("Illegal reference: {0}")]
    IllegalReference(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// A read-only source of build specifications.
pub trait SpecificationStore {
    /// Look up the specification registered under `key` and `identifier`.
    fn get(
        &self,
        key: &str,
        identifier: Option<&str>,
    ) -> Result<Arc<BuildSpecification>, LookupError>;
}

impl<S: SpecificationStore + ?Sized> SpecificationStore for Arc<S> {
    fn get(
        &self,
        key: &str,
        identifier: Option<&str>,
    ) -> Result<Arc<BuildSpecification>, LookupError> {
        (**self).get(key, identifier)
    }
}

impl<S: SpecificationStore + ?Sized> SpecificationStore for &S {
    fn get(
        &self,
        key: &str,
        identifier: Option<&str>,
    ) -> Result<Arc<BuildSpecification>, LookupError> {
        (**self).get(key, identifier)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

type StoreKey = (String, Option<String>);

/// Specifications registered in code.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    specs: BTreeMap<StoreKey, Arc<BuildSpecification>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` under `key` and `identifier`, replacing any previous entry.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        identifier: Option<&str>,
        spec: BuildSpecification,
    ) -> Option<Arc<BuildSpecification>> {
        self.insert_shared(key, identifier, Arc::new(spec))
    }

    /// Register an already shared specification.
    pub fn insert_shared(
        &mut self,
        key: impl Into<String>,
        identifier: Option<&str>,
        spec: Arc<BuildSpecification>,
    ) -> Option<Arc<BuildSpecification>> {
        self.specs
            .insert((key.into(), identifier.map(str::to_string)), spec)
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(
        mut self,
        key: impl Into<String>,
        identifier: Option<&str>,
        spec: BuildSpecification,
    ) -> Self {
        self.insert(key, identifier, spec);
        self
    }

    /// Number of registered specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Registered (key, identifier) pairs in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.specs
            .keys()
            .map(|(key, id)| (key.as_str(), id.as_deref()))
    }
}

impl SpecificationStore for MemoryStore {
    fn get(
        &self,
        key: &str,
        identifier: Option<&str>,
    ) -> Result<Arc<BuildSpecification>, LookupError> {
        self.specs
            .get(&(key.to_string(), identifier.map(str::to_string)))
            .cloned()
            .ok_or_else(|| LookupError::unknown(key, identifier))
    }
}

// =============================================================================
// TESTS
// =============================================================================
