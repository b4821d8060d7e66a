//! Multi-dimensional arrays as a flat, row-major buffer.

use super::{Primitive, TypeDescriptor, Value};
use thiserror::Error;

/// Why a store into an array slot was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayStoreError {
    /// The index has the wrong rank or is out of range.
    #[error("index {index:?} is out of bounds for shape {shape:?}")]
    OutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    /// The value cannot be stored in a slot of this element type.
    #[error("a value of type {actual} cannot be stored in an array of {expected}")]
    TypeMismatch { expected: String, actual: String },
}

/// An array of any rank.
///
/// Elements live in one buffer addressed by `shape`; every row of a level
/// has the same extent. Fresh slots hold the element type's default.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    element: TypeDescriptor,
    shape: Vec<usize>,
    data: Vec<Value>,
}

impl ArrayValue {
    /// Allocate an array filled with the element default.
    #[must_use]
    pub fn new(element: TypeDescriptor, shape: Vec<usize>) -> Self {
        let len = shape.iter().product::<usize>();
        let fill = match &element {
            TypeDescriptor::Primitive(p) => p.default_value(),
            _ => Value::Null,
        };
        Self {
            element,
            shape,
            data: vec![fill; len],
        }
    }

    /// Element type (never itself an array type).
    #[must_use]
    pub fn element_type(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Extent of every dimension, outermost first.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Length of the outermost dimension.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Whether the outermost dimension is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The array's own type.
    #[must_use]
    pub fn runtime_type(&self) -> TypeDescriptor {
        TypeDescriptor::array(self.element.clone(), self.rank())
    }

    /// All elements in row-major order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.data
    }

    /// Element at a full-rank index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<&Value> {
        self.offset(index).and_then(|i| self.data.get(i))
    }

    /// Copy out row `i` of the outermost dimension as an array of rank - 1.
    ///
    /// Returns `None` for one-dimensional arrays and out-of-range rows.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<ArrayValue> {
        if self.rank() < 2 || i >= self.len() {
            return None;
        }
        let sub_shape = self.shape[1..].to_vec();
        let stride = sub_shape.iter().product::<usize>();
        let start = i.checked_mul(stride)?;
        let data = self.data.get(start..start.checked_add(stride)?)?.to_vec();
        Some(Self {
            element: self.element.clone(),
            shape: sub_shape,
            data,
        })
    }

    /// Store `value` with reference-assignment rules.
    ///
    /// Primitive slots accept widened primitives; reference slots accept
    /// null and anything assignable to the element type.
    pub fn set(&mut self, index: &[usize], value: Value) -> Result<(), ArrayStoreError> {
        let slot = self.slot(index)?;
        let stored = value
            .coerce_to(&self.element)
            .ok_or_else(|| self.mismatch(&value))?;
        self.data[slot] = stored;
        Ok(())
    }

    /// Store `value` into a primitive slot of exactly the same kind.
    ///
    /// No widening and no null: the value must already be of the element kind.
    pub fn set_primitive(&mut self, index: &[usize], value: Value) -> Result<(), ArrayStoreError> {
        let slot = self.slot(index)?;
        let matches = match (&self.element, value.primitive()) {
            (TypeDescriptor::Primitive(expected), Some(actual)) => *expected == actual,
            _ => false,
        };
        if !matches {
            return Err(self.mismatch(&value));
        }
        self.data[slot] = value;
        Ok(())
    }

    /// Primitive kind of the elements, if any.
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        match self.element {
            TypeDescriptor::Primitive(p) => Some(p),
            _ => None,
        }
    }

    fn slot(&self, index: &[usize]) -> Result<usize, ArrayStoreError> {
        self.offset(index)
            .filter(|i| *i < self.data.len())
            .ok_or_else(|| ArrayStoreError::OutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            })
    }

    fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0usize;
        for (i, extent) in index.iter().zip(&self.shape) {
            if i >= extent {
                return None;
            }
            offset = offset.checked_mul(*extent)?.checked_add(*i)?;
        }
        Some(offset)
    }

    fn mismatch(&self, value: &Value) -> ArrayStoreError {
        ArrayStoreError::TypeMismatch {
            expected: self.element.name(),
            actual: value.runtime_type().name(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
