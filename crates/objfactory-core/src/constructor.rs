//! # Constructor Resolver
//!
//! Chooses and invokes an initializer of a class.
//!
//! Resolution runs in two phases:
//! 1. **Exact match**: an initializer whose declared parameter types equal
//!    the argument types position by position. If one exists it is invoked
//!    and its outcome is final.
//! 2. **Search**: every initializer is tried in declaration order. An
//!    argument mismatch moves on to the next one; any other failure ends the
//!    search. Running out of initializers means the object could not be
//!    initialized.

use crate::registry::InvokeError;
use crate::types::{ConstructionError, TypeDescriptor, Value};

/// Picks the initializer for a set of arguments.
pub struct ConstructorResolver;

impl ConstructorResolver {
    /// Build an instance of `ty` from `args`, whose declared types are `arg_types`.
    ///
    /// The built-in string type takes `()` and `(string)`. Other types that
    /// are not classes have no initializers.
    pub fn construct(
        ty: &TypeDescriptor,
        args: &[Value],
        arg_types: &[TypeDescriptor],
    ) -> Result<Value, ConstructionError> {
        let not_initialized = |source: Option<InvokeError>| ConstructionError::NotInitialized {
            type_name: ty.name(),
            source,
        };

        if *ty == TypeDescriptor::String {
            return Self::construct_string(args).ok_or_else(|| not_initialized(None));
        }
        let Some(class) = ty.as_class() else {
            return Err(not_initialized(None));
        };
        let initializers = class.initializers();

        if let Some(exact) = initializers.iter().find(|i| i.matches_exactly(arg_types)) {
            tracing::debug!(class = class.name(), arity = exact.arity(), "exact initializer match");
            return exact
                .invoke(class, args)
                .map_err(|e| not_initialized(Some(e)));
        }

        for (index, initializer) in initializers.iter().enumerate() {
            match initializer.invoke(class, args) {
                Ok(value) => {
                    tracing::debug!(class = class.name(), index, "initializer found by search");
                    return Ok(value);
                }
                Err(InvokeError::ArgumentMismatch(reason)) => {
                    tracing::trace!(class = class.name(), index, %reason, "initializer rejected arguments");
                }
                Err(other) => return Err(not_initialized(Some(other))),
            }
        }

        Err(not_initialized(None))
    }

    /// An empty string, or a copy of a single string argument.
    fn construct_string(args: &[Value]) -> Option<Value> {
        match args {
            [] => Some(Value::String(String::new())),
            [Value::String(s)] => Some(Value::String(s.clone())),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::registry::ClassDef;
    use crate::types::{BoxError, Primitive};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    fn int() -> TypeDescriptor {
        Primitive::Int.into()
    }

    fn long() -> TypeDescriptor {
        Primitive::Long.into()
    }

    fn tag_of(value: &Value) -> &'static str {
        match value.downcast_ref::<Tag>() {
            Some(tag) => tag.0,
            None => panic!("expected a Tag, got {value:?}"),
        }
    }

    fn overloaded() -> TypeDescriptor {
        ClassDef::builder("demo.Overloaded")
            .initializer([long()], |_| Ok(Tag("long")))
            .initializer([int(), TypeDescriptor::String], |_| Ok(Tag("int,string")))
            .initializer([int()], |_| Ok(Tag("int")))
            .build()
            .into()
    }

    #[test]
    fn exact_match_wins_over_declaration_order() {
        let value = ConstructorResolver::construct(&overloaded(), &[Value::Int(1)], &[int()])
            .expect("construct");
        assert_eq!(tag_of(&value), "int");
    }

    #[test]
    fn search_takes_first_fitting_initializer() {
        // Declared as `any`, so no exact match; widening lets the long initializer accept it.
        let value =
            ConstructorResolver::construct(&overloaded(), &[Value::Int(1)], &[TypeDescriptor::Any])
                .expect("construct");
        assert_eq!(tag_of(&value), "long");
    }

    #[test]
    fn search_skips_mismatches() {
        let value = ConstructorResolver::construct(
            &overloaded(),
            &[Value::Int(1), Value::Null],
            &[int(), TypeDescriptor::Null],
        )
        .expect("construct");
        assert_eq!(tag_of(&value), "int,string");
    }

    #[test]
    fn exhaustion_is_not_initialized() {
        let err = ConstructorResolver::construct(&overloaded(), &[Value::from("x")], &[TypeDescriptor::String])
            .expect_err("no initializer takes a string");
        assert!(matches!(
            err,
            ConstructionError::NotInitialized { source: None, .. }
        ));
    }

    #[test]
    fn raised_error_aborts_search() {
        let class: TypeDescriptor = ClassDef::builder("demo.Fragile")
            .initializer([TypeDescriptor::Any], |_| -> Result<Tag, BoxError> {
                Err("refused".into())
            })
            .initializer([TypeDescriptor::Any], |_| Ok(Tag("second")))
            .build()
            .into();
        let err = ConstructorResolver::construct(&class, &[Value::Null], &[TypeDescriptor::Null])
            .expect_err("first initializer raises");
        assert!(matches!(
            err,
            ConstructionError::NotInitialized {
                source: Some(InvokeError::Raised(_)),
                ..
            }
        ));
    }

    #[test]
    fn exact_match_failure_is_final() {
        let class: TypeDescriptor = ClassDef::builder("demo.Strict")
            .initializer([int()], |_| -> Result<Tag, BoxError> { Err("no".into()) })
            .initializer([long()], |_| Ok(Tag("long")))
            .build()
            .into();
        assert!(ConstructorResolver::construct(&class, &[Value::Int(1)], &[int()]).is_err());
    }

    #[test]
    fn abstract_and_restricted_classes_are_fatal() {
        let abstract_class: TypeDescriptor = ClassDef::builder("demo.Shape")
            .abstract_class()
            .initializer([], |_| Ok(Tag("shape")))
            .build()
            .into();
        assert!(matches!(
            ConstructorResolver::construct(&abstract_class, &[], &[]),
            Err(ConstructionError::NotInitialized {
                source: Some(InvokeError::Instantiation(_)),
                ..
            })
        ));

        let restricted: Arc<ClassDef> = ClassDef::builder("demo.Hidden")
            .restricted()
            .initializer([long()], |_| Ok(Tag("hidden")))
            .build();
        assert!(matches!(
            ConstructorResolver::construct(&restricted.into(), &[Value::Int(1)], &[int()]),
            Err(ConstructionError::NotInitialized {
                source: Some(InvokeError::Inaccessible(_)),
                ..
            })
        ));
    }

    #[test]
    fn non_classes_have_no_initializers() {
        assert!(matches!(
            ConstructorResolver::construct(&int(), &[], &[]),
            Err(ConstructionError::NotInitialized { source: None, .. })
        ));
    }

    #[test]
    fn builtin_string_initializers() {
        let string = TypeDescriptor::String;
        assert_eq!(
            ConstructorResolver::construct(&string, &[], &[]).expect("empty"),
            Value::from("")
        );
        assert_eq!(
            ConstructorResolver::construct(&string, &[Value::from("abc")], &[TypeDescriptor::Any])
                .expect("copy"),
            Value::from("abc")
        );
        for args in [vec![Value::Null], vec![Value::Int(1)], vec![Value::from("a"), Value::from("b")]] {
            assert!(matches!(
                ConstructorResolver::construct(&string, &args, &[]),
                Err(ConstructionError::NotInitialized { source: None, .. })
            ));
        }
    }
}
