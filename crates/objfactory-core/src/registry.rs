//! # Type Registry
//!
//! The explicit replacement for runtime type lookup.
//!
//! A [`TypeRegistry`] maps type names to [`ClassDef`]s. Each class carries an
//! ordered list of [`Initializer`]s: declared parameter types plus a closure
//! that builds the object from an [`Arguments`] view. Declaration order is
//! significant: the constructor resolver's search walks it front to back.
//!
//! ```
//! # #![allow(dead_code)]
//! use objfactory_core::registry::{ClassDef, TypeRegistry};
//! use objfactory_core::Primitive;
//!
//! #[derive(Debug)]
//! struct Point { x: i32, y: i32 }
//!
//! let point = ClassDef::builder("geometry.Point")
//!     .initializer(
//!         [Primitive::Int.into(), Primitive::Int.into()],
//!         |args| Ok(Point { x: args.int(0)?, y: args.int(1)? }),
//!     )
//!     .build();
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(point);
//! assert!(registry.resolve("geometry.Point").is_some());
//! ```

use crate::primitives::{ANY, STRING_FULL};
use crate::types::{ArrayValue, BoxError, Instance, Object, TypeDescriptor, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Why invoking an initializer failed.
///
/// Only `ArgumentMismatch` lets the backtracking search move on to the next
/// initializer; every other variant ends the search.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The arguments do not fit the declared parameters.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// The class does not permit construction from outside.
    #[error("class {0} is not accessible")]
    Inaccessible(String),

    /// The class is abstract.
    #[error("class {0} cannot be instantiated")]
    Instantiation(String),

    /// The initializer body returned an error.
    #[error("initializer raised an error: {0}")]
    Raised(#[source] BoxError),
}

/// An initializer body asked for an argument it was not given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("argument {index} is not a {expected}")]
pub struct ArgumentError {
    pub index: usize,
    pub expected: &'static str,
}

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Read-only view of the (already coerced) arguments of one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    /// Wrap an argument slice.
    #[must_use]
    pub const fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    fn expect<T>(
        &self,
        index: usize,
        expected: &'static str,
        pick: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, ArgumentError> {
        self.values
            .get(index)
            .and_then(pick)
            .ok_or(ArgumentError { index, expected })
    }

    pub fn byte(&self, index: usize) -> Result<i8, ArgumentError> {
        self.expect(index, "byte", |v| match v {
            Value::Byte(b) => Some(*b),
            _ => None,
        })
    }

    pub fn short(&self, index: usize) -> Result<i16, ArgumentError> {
        self.expect(index, "short", |v| match v {
            Value::Short(s) => Some(*s),
            _ => None,
        })
    }

    pub fn int(&self, index: usize) -> Result<i32, ArgumentError> {
        self.expect(index, "int", Value::as_int)
    }

    pub fn long(&self, index: usize) -> Result<i64, ArgumentError> {
        self.expect(index, "long", Value::as_long)
    }

    pub fn float(&self, index: usize) -> Result<f32, ArgumentError> {
        self.expect(index, "float", |v| match v {
            Value::Float(f) => Some(*f),
            _ => None,
        })
    }

    pub fn double(&self, index: usize) -> Result<f64, ArgumentError> {
        self.expect(index, "double", Value::as_double)
    }

    pub fn char(&self, index: usize) -> Result<char, ArgumentError> {
        self.expect(index, "char", Value::as_char)
    }

    pub fn boolean(&self, index: usize) -> Result<bool, ArgumentError> {
        self.expect(index, "boolean", Value::as_bool)
    }

    /// A non-null string argument.
    pub fn string(&self, index: usize) -> Result<&'a str, ArgumentError> {
        self.expect(index, "string", Value::as_str)
    }

    /// A string argument that may be null.
    pub fn optional_string(&self, index: usize) -> Result<Option<&'a str>, ArgumentError> {
        self.expect(index, "string or null", |v| match v {
            Value::Null => Some(None),
            Value::String(s) => Some(Some(s.as_str())),
            _ => None,
        })
    }

    /// A non-null array argument.
    pub fn array(&self, index: usize) -> Result<&'a ArrayValue, ArgumentError> {
        self.expect(index, "array", Value::as_array)
    }

    /// A non-null object argument, downcast to `T`.
    pub fn object<T: Any>(&self, index: usize) -> Result<&'a T, ArgumentError> {
        self.expect(index, "object of the requested type", |v| v.downcast_ref::<T>())
    }

    /// An object argument that may be null.
    pub fn optional_object<T: Any>(&self, index: usize) -> Result<Option<&'a T>, ArgumentError> {
        self.expect(index, "object of the requested type or null", |v| match v {
            Value::Null => Some(None),
            other => other.downcast_ref::<T>().map(Some),
        })
    }
}

// =============================================================================
// INITIALIZER
// =============================================================================

type InitFn = dyn Fn(&Arguments<'_>) -> Result<Arc<dyn Object>, BoxError> + Send + Sync;

/// One way of building an instance of a class.
#[derive(Clone)]
pub struct Initializer {
    params: Vec<TypeDescriptor>,
    body: Arc<InitFn>,
}

impl Initializer {
    /// Declared parameter types, in order.
    #[must_use]
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the declared parameter types equal `types` positionally.
    #[must_use]
    pub fn matches_exactly(&self, types: &[TypeDescriptor]) -> bool {
        self.params.as_slice() == types
    }

    /// Invoke on behalf of `class`.
    ///
    /// Checks run in a fixed order: accessibility, instantiability, arity,
    /// per-argument assignability, then the body itself.
    pub fn invoke(&self, class: &Arc<ClassDef>, args: &[Value]) -> Result<Value, InvokeError> {
        if !class.accessible {
            return Err(InvokeError::Inaccessible(class.name.clone()));
        }
        if class.is_abstract {
            return Err(InvokeError::Instantiation(class.name.clone()));
        }
        if args.len() != self.params.len() {
            return Err(InvokeError::ArgumentMismatch(format!(
                "expected {} arguments, got {}",
                self.params.len(),
                args.len()
            )));
        }

        let mut coerced = Vec::with_capacity(args.len());
        for (i, (arg, param)) in args.iter().zip(&self.params).enumerate() {
            let value = arg.coerce_to(param).ok_or_else(|| {
                InvokeError::ArgumentMismatch(format!(
                    "argument {} of type {} does not fit parameter of type {}",
                    i,
                    arg.runtime_type(),
                    param
                ))
            })?;
            coerced.push(value);
        }

        let data = (self.body)(&Arguments::new(&coerced)).map_err(InvokeError::Raised)?;
        Ok(Value::Object(Instance::new(Arc::clone(class), data)))
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("params", &self.params)
            .finish()
    }
}

// =============================================================================
// CLASS
// =============================================================================

/// A registered class.
pub struct ClassDef {
    name: String,
    supertypes: Vec<String>,
    is_abstract: bool,
    accessible: bool,
    initializers: Vec<Initializer>,
}

impl ClassDef {
    /// Start describing a class.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            supertypes: Vec::new(),
            is_abstract: false,
            accessible: true,
            initializers: Vec::new(),
        }
    }

    /// Fully qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every type this class may be used as, besides itself.
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Whether the class can never be instantiated.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether the class may be constructed from outside.
    #[must_use]
    pub const fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Initializers in declaration order.
    #[must_use]
    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    /// Whether this class is `name` or lists it as a supertype.
    #[must_use]
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name == name || self.supertypes.iter().any(|s| s == name)
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("supertypes", &self.supertypes)
            .field("is_abstract", &self.is_abstract)
            .field("accessible", &self.accessible)
            .field("initializers", &self.initializers.len())
            .finish()
    }
}

/// Builder for [`ClassDef`].
pub struct ClassBuilder {
    name: String,
    supertypes: Vec<String>,
    is_abstract: bool,
    accessible: bool,
    initializers: Vec<Initializer>,
}

impl ClassBuilder {
    /// Declare a supertype. List every ancestor; supertypes are not chased
    /// transitively.
    #[must_use]
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Mark the class abstract.
    #[must_use]
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark the class as not constructible from outside.
    #[must_use]
    pub fn restricted(mut self) -> Self {
        self.accessible = false;
        self
    }

    /// Append an initializer.
    #[must_use]
    pub fn initializer<T, F>(mut self, params: impl IntoIterator<Item = TypeDescriptor>, body: F) -> Self
    where
        T: Object,
        F: Fn(&Arguments<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let body: Arc<InitFn> = Arc::new(move |args: &Arguments<'_>| {
            body(args).map(|object| Arc::new(object) as Arc<dyn Object>)
        });
        self.initializers.push(Initializer {
            params: params.into_iter().collect(),
            body,
        });
        self
    }

    /// Finish the class.
    #[must_use]
    pub fn build(self) -> Arc<ClassDef> {
        Arc::new(ClassDef {
            name: self.name,
            supertypes: self.supertypes,
            is_abstract: self.is_abstract,
            accessible: self.accessible,
            initializers: self.initializers,
        })
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// A namespace of classes.
///
/// Lookup order: built-in names, then this registry's classes, then the
/// parent registry (if any). The built-in string type is not a class; its
/// `()` and `(string)` initializers live in
/// [`ConstructorResolver`](crate::constructor::ConstructorResolver).
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    classes: BTreeMap<String, Arc<ClassDef>>,
    parent: Option<Arc<TypeRegistry>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that falls back to `parent`.
    #[must_use]
    pub fn with_parent(parent: Arc<TypeRegistry>) -> Self {
        Self {
            classes: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    /// Register a class, replacing any class of the same name.
    /// Returns the replaced class.
    pub fn register(&mut self, class: Arc<ClassDef>) -> Option<Arc<ClassDef>> {
        self.classes.insert(class.name().to_string(), class)
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, class: Arc<ClassDef>) -> Self {
        self.register(class);
        self
    }

    /// Look up a class defined here or in a parent.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<Arc<ClassDef>> {
        match self.classes.get(name) {
            Some(class) => Some(Arc::clone(class)),
            None => self.parent.as_ref().and_then(|p| p.class(name)),
        }
    }

    /// Resolve a non-alias type name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TypeDescriptor> {
        match name {
            STRING_FULL => Some(TypeDescriptor::String),
            ANY => Some(TypeDescriptor::Any),
            _ => self.class(name).map(TypeDescriptor::Class),
        }
    }

    /// Names of the classes defined directly in this registry.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Number of classes defined directly in this registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is defined directly in this registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
