//! # Build Specifications
//!
//! The declarative description of one value to build.
//!
//! A specification is plain data: it is produced by a store, shared
//! read-only through `Arc`, and interpreted by the engine once per call.
//!
//! | kind      | uses                                          |
//! |-----------|-----------------------------------------------|
//! | `Null`    | `type_name` (informational)                   |
//! | `Simple`  | `type_name` (simple alias), `value`           |
//! | `Complex` | `type_name`, `parameters`, `code_location`    |
//! | `Array`   | `type_name` (element), `parameters`, `dimension`, `code_location` |

use crate::types::{ConstructionError, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which of the four node kinds a specification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Null,
    Simple,
    Complex,
    Array,
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Simple => "simple",
            Self::Complex => "complex",
            Self::Array => "array",
        };
        f.write_str(name)
    }
}

/// One entry of a specification's parameter list.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// A nested specification, interpreted recursively.
    Spec(Arc<BuildSpecification>),
    /// A value that is already built.
    Value(Value),
    /// A row of a multi-dimensional array. Only valid inside `Array` specs.
    Nested(Vec<Parameter>),
}

impl Parameter {
    /// Wrap a specification.
    #[must_use]
    pub fn spec(spec: BuildSpecification) -> Self {
        Self::Spec(Arc::new(spec))
    }
}

impl From<BuildSpecification> for Parameter {
    fn from(spec: BuildSpecification) -> Self {
        Self::spec(spec)
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// A node of a construction plan.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSpecification {
    kind: SpecKind,
    type_name: String,
    value: Option<String>,
    parameters: Vec<Parameter>,
    dimension: usize,
    code_location: Option<String>,
    identifier: Option<String>,
}

impl BuildSpecification {
    fn with_kind(kind: SpecKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            value: None,
            parameters: Vec::new(),
            dimension: 1,
            code_location: None,
            identifier: None,
        }
    }

    /// A null value of the given type.
    #[must_use]
    pub fn null(type_name: impl Into<String>) -> Self {
        Self::with_kind(SpecKind::Null, type_name)
    }

    /// A scalar parsed from text.
    #[must_use]
    pub fn simple(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::with_kind(SpecKind::Simple, type_name)
        }
    }

    /// An object built by an initializer of `type_name`.
    #[must_use]
    pub fn complex(type_name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            parameters,
            ..Self::with_kind(SpecKind::Complex, type_name)
        }
    }

    /// An array of `element_type` with the given declared rank.
    #[must_use]
    pub fn array(
        element_type: impl Into<String>,
        dimension: usize,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            parameters,
            dimension,
            ..Self::with_kind(SpecKind::Array, element_type)
        }
    }

    /// Load the type from an external code bundle.
    #[must_use]
    pub fn with_code_location(mut self, location: impl Into<String>) -> Self {
        self.code_location = Some(location.into());
        self
    }

    /// Record the identifier this specification is registered under.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Text of a simple specification.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Declared rank of an array specification.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn code_location(&self) -> Option<&str> {
        self.code_location.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

/// Compute the extents of a nested parameter tree.
///
/// A level's shape is `[len, ...child_shape]`, where every child row must have
/// the same shape. Leaves contribute nothing, so a level of leaves is `[len]`.
pub fn shape_of(parameters: &[Parameter]) -> Result<Vec<usize>, ConstructionError> {
    let mut child_shape: Option<Vec<usize>> = None;
    for parameter in parameters {
        if let Parameter::Nested(children) = parameter {
            let shape = shape_of(children)?;
            match &child_shape {
                Some(existing) if *existing != shape => {
                    return Err(ConstructionError::InvalidArrayShape);
                }
                Some(_) => {}
                None => child_shape = Some(shape),
            }
        }
    }

    let mut shape = vec![parameters.len()];
    shape.extend(child_shape.unwrap_or_default());
    Ok(shape)
}

// =============================================================================
// TESTS
// =============================================================================
