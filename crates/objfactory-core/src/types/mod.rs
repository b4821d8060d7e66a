//! # Core Type Definitions
//!
//! This module contains the vocabulary every other module speaks:
//! - Primitive kinds and type descriptors (`Primitive`, `TypeDescriptor`)
//! - Runtime values (`Value`, `Instance`, `ArrayValue`)
//! - Error types (`FactoryError`, `ConstructionError`)
//!
//! ## Assignability
//!
//! Type descriptors follow a small nominal type system:
//! - Primitives are only assignable to themselves (values may widen, types may not)
//! - `Any` accepts every reference type
//! - `Null` is the type of the null value and is accepted by every reference type
//! - Classes accept themselves and any class that lists them as a supertype
//! - Arrays accept arrays of equal rank with an assignable element type

mod array;
mod value;

pub use array::{ArrayStoreError, ArrayValue};
pub use value::{Instance, Object, Value};

use crate::primitives::{ANY, BOOLEAN, BYTE, CHAR, DOUBLE, FLOAT, INT, LONG, SHORT, STRING_FULL};
use crate::registry::{ClassDef, InvokeError};
use crate::store::LookupError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error used for causes that come from user code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// The eight primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
}

impl Primitive {
    /// The alias this primitive is spelled with in specifications.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => BYTE,
            Self::Short => SHORT,
            Self::Int => INT,
            Self::Long => LONG,
            Self::Float => FLOAT,
            Self::Double => DOUBLE,
            Self::Char => CHAR,
            Self::Boolean => BOOLEAN,
        }
    }

    /// Look up a primitive by alias.
    #[must_use]
    pub fn from_alias(name: &str) -> Option<Self> {
        match name {
            BYTE => Some(Self::Byte),
            SHORT => Some(Self::Short),
            INT => Some(Self::Int),
            LONG => Some(Self::Long),
            FLOAT => Some(Self::Float),
            DOUBLE => Some(Self::Double),
            CHAR => Some(Self::Char),
            BOOLEAN => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Whether a value of this kind may be passed where `target` is declared.
    ///
    /// Widening only: byte → short → int → long → float → double,
    /// char → int, and every kind to itself.
    #[must_use]
    pub const fn widens_to(self, target: Self) -> bool {
        use Primitive::{Boolean, Byte, Char, Double, Float, Int, Long, Short};
        matches!(
            (self, target),
            (Byte, Byte | Short | Int | Long | Float | Double)
                | (Short, Short | Int | Long | Float | Double)
                | (Char, Char | Int | Long | Float | Double)
                | (Int, Int | Long | Float | Double)
                | (Long, Long | Float | Double)
                | (Float, Float | Double)
                | (Double, Double)
                | (Boolean, Boolean)
        )
    }

    /// The value a freshly allocated array slot of this kind holds.
    #[must_use]
    pub const fn default_value(self) -> Value {
        match self {
            Self::Byte => Value::Byte(0),
            Self::Short => Value::Short(0),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::Char => Value::Char('\0'),
            Self::Boolean => Value::Boolean(false),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TYPE DESCRIPTOR
// =============================================================================

/// A constructible (or at least nameable) type.
///
/// Equality is nominal: two class descriptors are equal when their names are,
/// even if they were registered in different registries.
#[derive(Clone)]
pub enum TypeDescriptor {
    /// One of the primitive kinds.
    Primitive(Primitive),
    /// The string type (both string aliases resolve here).
    String,
    /// The root reference type.
    Any,
    /// The type of the null value. Never declared, only inferred.
    Null,
    /// A registered class.
    Class(Arc<ClassDef>),
    /// An array of `rank` dimensions.
    Array {
        element: Box<TypeDescriptor>,
        rank: usize,
    },
}

impl TypeDescriptor {
    /// Build an array type. Nested array element types are flattened, so
    /// `array(array(int, 1), 1)` is the same as `array(int, 2)`.
    #[must_use]
    pub fn array(element: TypeDescriptor, rank: usize) -> Self {
        if rank == 0 {
            return element;
        }
        match element {
            Self::Array {
                element: inner,
                rank: inner_rank,
            } => Self::Array {
                element: inner,
                rank: inner_rank.saturating_add(rank),
            },
            other => Self::Array {
                element: Box::new(other),
                rank,
            },
        }
    }

    /// Name of the type as it would be written in a specification.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::String => STRING_FULL.to_string(),
            Self::Any => ANY.to_string(),
            Self::Null => "null".to_string(),
            Self::Class(class) => class.name().to_string(),
            Self::Array { element, rank } => {
                format!("{}{}", element.name(), "[]".repeat(*rank))
            }
        }
    }

    /// Whether this is a primitive type.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Number of array dimensions (0 for non-arrays).
    #[must_use]
    pub const fn rank(&self) -> usize {
        match self {
            Self::Array { rank, .. } => *rank,
            _ => 0,
        }
    }

    /// The innermost element type, with every level of array nesting removed.
    #[must_use]
    pub fn element_type(&self) -> &TypeDescriptor {
        match self {
            Self::Array { element, .. } => element.element_type(),
            other => other,
        }
    }

    /// The registered class, if this is a class type.
    #[must_use]
    pub fn as_class(&self) -> Option<&Arc<ClassDef>> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Whether a value of type `other` may be stored where `self` is declared.
    #[must_use]
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::Primitive(_), _) | (_, Self::Primitive(_)) => false,
            (_, Self::Null) => true,
            (Self::Null, _) => false,
            (Self::Any, _) => true,
            (Self::String, Self::String) => true,
            (Self::Class(target), Self::Class(source)) => source.is_subtype_of(target.name()),
            (
                Self::Array {
                    element: target,
                    rank: target_rank,
                },
                Self::Array {
                    element: source,
                    rank: source_rank,
                },
            ) => target_rank == source_rank && target.is_assignable_from(source),
            _ => false,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::String, Self::String) | (Self::Any, Self::Any) | (Self::Null, Self::Null) => {
                true
            }
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b) || a.name() == b.name(),
            (
                Self::Array {
                    element: a,
                    rank: ra,
                },
                Self::Array {
                    element: b,
                    rank: rb,
                },
            ) => ra == rb && a == b,
            _ => false,
        }
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<Primitive> for TypeDescriptor {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl From<Arc<ClassDef>> for TypeDescriptor {
    fn from(class: Arc<ClassDef>) -> Self {
        Self::Class(class)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the construction engine.
///
/// There are exactly two kinds a caller has to tell apart:
/// - `InvalidArgument`: the call itself was malformed, nothing was attempted
/// - `Construction`: building the object failed; the cause says why
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The call was malformed (empty key, mismatched argument lists, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Building the object failed after validation.
    #[error("Object creation failed: {0}")]
    Construction(#[from] ConstructionError),
}

impl FactoryError {
    /// The construction cause, if this is a construction failure.
    #[must_use]
    pub fn construction(&self) -> Option<&ConstructionError> {
        match self {
            Self::Construction(e) => Some(e),
            Self::InvalidArgument(_) => None,
        }
    }
}

/// Everything that can go wrong while building an object.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// No type with this name is visible.
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// A code location could not be turned into a loading context.
    #[error("Code bundle could not be loaded: {0}")]
    BundleUnavailable(String),

    /// The specification store could not supply the specification.
    #[error("Error occurs when getting specifications")]
    Lookup(#[source] LookupError),

    /// A simple value was empty.
    #[error("The value should not be empty (type {type_name})")]
    EmptyValue { type_name: String },

    /// A numeric literal could not be parsed.
    #[error("The number format is invalid for {type_name}: {text:?}")]
    InvalidNumber {
        type_name: String,
        text: String,
        #[source]
        source: BoxError,
    },

    /// A simple specification named a type outside the simple vocabulary.
    #[error("The simple type is unexpected: {0}")]
    UnexpectedSimpleType(String),

    /// A nested row appeared outside an array specification.
    #[error("Nested parameters are only allowed in array specifications")]
    UnexpectedNesting,

    /// Sibling rows of an array have different shapes.
    #[error("The array is not valid")]
    InvalidArrayShape,

    /// An element could not be stored into the array being built.
    #[error("The array could not be populated: {0}")]
    ArrayPopulation(String),

    /// No initializer produced the object.
    #[error("The object could not be initialized: {type_name}")]
    NotInitialized {
        type_name: String,
        #[source]
        source: Option<InvokeError>,
    },

    /// The produced value is not of the requested type.
    #[error("The type returned should be {expected}, but is {actual}")]
    NotAssignable { expected: String, actual: String },
}

// =============================================================================
// TESTS
// =============================================================================
