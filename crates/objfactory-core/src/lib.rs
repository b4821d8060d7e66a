//! # objfactory-core
//!
//! The specification-driven object construction engine.
//!
//! Given a key (and optionally an identifier), the engine produces a fully
//! initialized object, either by interpreting a declarative
//! [`BuildSpecification`] found in a [`SpecificationStore`], or by calling
//! the initializers a class registered in a [`TypeRegistry`], or by trying
//! both in the order the [`Strategy`] dictates.
//!
//! ## Architectural Constraints
//!
//! - Types are registered explicitly; nothing is discovered at runtime
//! - Synchronous: every call either fully succeeds or fully fails
//! - Specifications are immutable once a store hands them out
//! - The only mutable engine state is the default strategy
//! - No async, no network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod array_builder;
pub mod constructor;
pub mod factory;
pub mod formats;
pub mod loading;
pub mod primitives;
pub mod registry;
pub mod resolver;
pub mod simple;
pub mod specification;
pub mod store;
pub mod strategy;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ArrayStoreError, ArrayValue, BoxError, ConstructionError, FactoryError, Instance, Object,
    Primitive, TypeDescriptor, Value,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use array_builder::ArrayBuilder;
pub use constructor::ConstructorResolver;
pub use factory::ObjectFactory;
pub use loading::{BundleCatalog, LoadingContext};
pub use registry::{ArgumentError, Arguments, ClassBuilder, ClassDef, Initializer, InvokeError, TypeRegistry};
pub use resolver::TypeResolver;
pub use simple::SimpleValueParser;
pub use specification::{BuildSpecification, Parameter, SpecKind, shape_of};
pub use strategy::Strategy;

// =============================================================================
// RE-EXPORTS: Stores (from store and formats modules)
// =============================================================================

pub use formats::ConfigStore;
pub use store::{LookupError, MemoryStore, SpecificationStore, StoreError};
