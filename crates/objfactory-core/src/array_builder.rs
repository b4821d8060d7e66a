//! # Array Builder
//!
//! Turns a nested parameter tree into an [`ArrayValue`].
//!
//! The shape comes from the tree itself (see [`shape_of`]) and must have as
//! many dimensions as the specification declares. Leaves are either nested
//! specifications, interpreted through the caller's closure, or values that
//! are already built.

use crate::primitives::is_simple_type;
use crate::specification::{BuildSpecification, Parameter, shape_of};
use crate::types::{ArrayValue, ConstructionError, TypeDescriptor, Value};

/// Builds arrays from nested parameters.
pub struct ArrayBuilder;

impl ArrayBuilder {
    /// Build an array of `element` with `dimension` dimensions.
    ///
    /// `element_name` is the element type as written in the specification;
    /// primitive aliases get the strict, no-widening store for interpreted
    /// elements.
    pub fn build<F>(
        element_name: &str,
        element: &TypeDescriptor,
        dimension: usize,
        parameters: &[Parameter],
        mut interpret: F,
    ) -> Result<ArrayValue, ConstructionError>
    where
        F: FnMut(&BuildSpecification) -> Result<Value, ConstructionError>,
    {
        let shape = if parameters.is_empty() {
            vec![0; dimension.max(1)]
        } else {
            shape_of(parameters)?
        };
        if shape.len() != dimension.max(1) {
            return Err(ConstructionError::InvalidArrayShape);
        }

        let mut array = ArrayValue::new(element.clone(), shape);
        let strict = element.is_primitive() && is_simple_type(element_name);
        let mut fill = Filler {
            array: &mut array,
            strict,
            index: Vec::with_capacity(dimension),
            interpret: &mut interpret,
        };
        fill.level(parameters, dimension.max(1))?;
        Ok(array)
    }
}

struct Filler<'a, F> {
    array: &'a mut ArrayValue,
    strict: bool,
    index: Vec<usize>,
    interpret: &'a mut F,
}

impl<F> Filler<'_, F>
where
    F: FnMut(&BuildSpecification) -> Result<Value, ConstructionError>,
{
    fn level(&mut self, parameters: &[Parameter], remaining: usize) -> Result<(), ConstructionError> {
        for (i, parameter) in parameters.iter().enumerate() {
            self.index.push(i);
            match (parameter, remaining) {
                (Parameter::Nested(children), r) if r > 1 => self.level(children, r - 1)?,
                (Parameter::Spec(spec), 1) => {
                    let value = (self.interpret)(spec)?;
                    self.store(value, self.strict)?;
                }
                (Parameter::Value(value), 1) => self.store(value.clone(), false)?,
                _ => {
                    return Err(ConstructionError::ArrayPopulation(format!(
                        "malformed row at index {:?}",
                        self.index
                    )));
                }
            }
            self.index.pop();
        }
        Ok(())
    }

    fn store(&mut self, value: Value, strict: bool) -> Result<(), ConstructionError> {
        let stored = if strict {
            self.array.set_primitive(&self.index, value)
        } else {
            self.array.set(&self.index, value)
        };
        stored.map_err(|e| ConstructionError::ArrayPopulation(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::SimpleValueParser;
    use crate::types::Primitive;

    fn simple_interpreter(spec: &BuildSpecification) -> Result<Value, ConstructionError> {
        SimpleValueParser::parse(spec.type_name(), spec.value().unwrap_or_default())
    }

    fn int_spec(v: i32) -> Parameter {
        Parameter::spec(BuildSpecification::simple("int", v.to_string()))
    }

    fn int_row(values: &[i32]) -> Parameter {
        Parameter::Nested(values.iter().map(|v| int_spec(*v)).collect())
    }

    fn int_type() -> TypeDescriptor {
        Primitive::Int.into()
    }

    #[test]
    fn builds_two_dimensional_int_arrays() {
        let params = [int_row(&[1, 2]), int_row(&[3, 4]), int_row(&[5, 6])];
        let array = ArrayBuilder::build("int", &int_type(), 2, &params, simple_interpreter)
            .expect("build");
        assert_eq!(array.shape(), &[3, 2]);
        assert_eq!(array.get(&[2, 1]), Some(&Value::Int(6)));
        assert_eq!(array.runtime_type(), TypeDescriptor::array(int_type(), 2));
    }

    #[test]
    fn ragged_rows_are_invalid() {
        let params = [int_row(&[1, 2]), int_row(&[3])];
        assert!(matches!(
            ArrayBuilder::build("int", &int_type(), 2, &params, simple_interpreter),
            Err(ConstructionError::InvalidArrayShape)
        ));
    }

    #[test]
    fn depth_must_match_declared_dimension() {
        let params = [int_spec(1), int_spec(2)];
        assert!(matches!(
            ArrayBuilder::build("int", &int_type(), 2, &params, simple_interpreter),
            Err(ConstructionError::InvalidArrayShape)
        ));
    }

    #[test]
    fn empty_parameters_give_zero_extents() {
        let array = ArrayBuilder::build("int", &int_type(), 3, &[], simple_interpreter)
            .expect("build");
        assert_eq!(array.shape(), &[0, 0, 0]);
    }

    #[test]
    fn primitive_aliases_do_not_widen_interpreted_elements() {
        let params = [int_spec(1)];
        let longs: TypeDescriptor = Primitive::Long.into();
        assert!(matches!(
            ArrayBuilder::build("long", &longs, 1, &params, simple_interpreter),
            Err(ConstructionError::ArrayPopulation(_))
        ));
    }

    #[test]
    fn raw_values_widen() {
        let params = [Parameter::Value(Value::Int(7))];
        let longs: TypeDescriptor = Primitive::Long.into();
        let array = ArrayBuilder::build("long", &longs, 1, &params, simple_interpreter)
            .expect("build");
        assert_eq!(array.get(&[0]), Some(&Value::Long(7)));
    }

    #[test]
    fn null_elements_in_primitive_arrays_fail() {
        let params = [Parameter::spec(BuildSpecification::null("int"))];
        let result = ArrayBuilder::build("int", &int_type(), 1, &params, |spec| match spec.kind() {
            crate::specification::SpecKind::Null => Ok(Value::Null),
            _ => simple_interpreter(spec),
        });
        assert!(matches!(result, Err(ConstructionError::ArrayPopulation(_))));
    }

    #[test]
    fn string_arrays_accept_nulls() {
        let params = [
            Parameter::spec(BuildSpecification::simple("string", "a")),
            Parameter::Value(Value::Null),
        ];
        let array = ArrayBuilder::build("string", &TypeDescriptor::String, 1, &params, simple_interpreter)
            .expect("build");
        assert_eq!(array.values(), &[Value::from("a"), Value::Null]);
    }

    #[test]
    fn leaves_where_rows_belong_fail() {
        let params = [int_row(&[1, 2]), int_spec(3)];
        assert!(matches!(
            ArrayBuilder::build("int", &int_type(), 2, &params, simple_interpreter),
            Err(ConstructionError::ArrayPopulation(_))
        ));
    }
}
