//! # Property-Based Tests
//!
//! Invariants of the construction engine checked with proptest.

use objfactory_core::{
    BuildSpecification, ClassDef, ConfigStore, ConstructionError, FactoryError, MemoryStore,
    ObjectFactory, Parameter, Primitive, SimpleValueParser, Strategy, TypeDescriptor,
    TypeRegistry, Value, shape_of,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct Pair {
    via: &'static str,
    n: i32,
    s: String,
}

fn pair_factory() -> ObjectFactory<MemoryStore> {
    let pair = ClassDef::builder("demo.Pair")
        .initializer(
            [TypeDescriptor::Any, TypeDescriptor::Any],
            |_| Ok(Pair { via: "any,any", n: 0, s: String::new() }),
        )
        .initializer([Primitive::Int.into(), TypeDescriptor::String], |args| {
            Ok(Pair {
                via: "int,string",
                n: args.int(0)?,
                s: args.string(1)?.to_string(),
            })
        })
        .build();
    ObjectFactory::new(MemoryStore::new(), Arc::new(TypeRegistry::new().with(pair)))
}

fn int_grid(rows: usize, cols: usize) -> Vec<Parameter> {
    (0..rows)
        .map(|r| {
            Parameter::Nested(
                (0..cols)
                    .map(|c| {
                        Parameter::spec(BuildSpecification::simple("int", (r * cols + c).to_string()))
                    })
                    .collect(),
            )
        })
        .collect()
}

fn grid_literal(rows: usize, cols: usize) -> String {
    let rows: Vec<String> = (0..rows)
        .map(|r| {
            let items: Vec<String> = (0..cols).map(|c| (r * cols + c).to_string()).collect();
            format!("{{{}}}", items.join(", "))
        })
        .collect();
    format!("{{{}}}", rows.join(", "))
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Declared (int, string) always reaches the (int, string) initializer.
    #[test]
    fn exact_match_carries_both_values(n in any::<i32>(), s in "[a-zA-Z0-9 ]{0,16}") {
        let factory = pair_factory();
        let args = [Value::Int(n), Value::from(s.as_str())];
        let types = [TypeDescriptor::from(Primitive::Int), TypeDescriptor::String];

        let value = factory
            .create_full("demo.Pair", None, None, Some(&args), Some(&types), Strategy::ReflectionOnly)
            .expect("create");
        let pair = value.downcast_ref::<Pair>().expect("pair");

        prop_assert_eq!(pair.via, "int,string");
        prop_assert_eq!(pair.n, n);
        prop_assert_eq!(&pair.s, &s);
    }

    /// An a x b grid specification yields an a x b array.
    #[test]
    fn grid_shape_is_preserved(rows in 1usize..6, cols in 1usize..6) {
        let spec = BuildSpecification::array("int", 2, int_grid(rows, cols));
        let value = pair_factory().interpret(&spec).expect("interpret");
        let array = value.as_array().expect("array");

        prop_assert_eq!(array.shape(), &[rows, cols][..]);
        for r in 0..rows {
            prop_assert_eq!(array.row(r).expect("row").len(), cols);
        }
        let last = i32::try_from(rows * cols - 1).expect("small");
        prop_assert_eq!(array.get(&[rows - 1, cols - 1]), Some(&Value::Int(last)));
    }

    /// Any row of a different length makes the array invalid.
    #[test]
    fn ragged_grids_are_invalid(rows in 2usize..6, cols in 1usize..6, bad in 0usize..6, extra in 1usize..3) {
        let bad = bad % rows;
        let mut params = int_grid(rows, cols);
        params[bad] = int_grid(1, cols + extra).remove(0);

        let spec = BuildSpecification::array("int", 2, params);
        let result = pair_factory().interpret(&spec);
        prop_assert!(matches!(result, Err(ConstructionError::InvalidArrayShape)));
    }

    /// Brace literals loaded from TOML keep the shape they were written with.
    #[test]
    fn literal_shape_survives_the_store(rows in 1usize..5, cols in 1usize..5) {
        let text = format!(
            "[grid]\narray_type = \"int\"\ndimension = 2\nvalues = \"{}\"\n",
            grid_literal(rows, cols)
        );
        let store = ConfigStore::from_toml_str(&text).expect("store");
        let spec = objfactory_core::SpecificationStore::get(&store, "grid", None).expect("spec");
        prop_assert_eq!(shape_of(spec.parameters()).expect("shape"), vec![rows, cols]);
    }

    /// Whitespace-only keys are always invalid arguments.
    #[test]
    fn blank_keys_are_invalid(key in "[ \t\r\n]{0,8}") {
        let result = pair_factory().create(&key);
        prop_assert!(matches!(result, Err(FactoryError::InvalidArgument(_))));
    }

    /// Unknown strategy names never change the configured strategy.
    #[test]
    fn unknown_strategies_are_rejected(name in "[a-z]{1,12}") {
        prop_assume!(!["both", "reflection", "specification"].contains(&name.as_str()));
        let mut factory = pair_factory();
        factory.set_strategy(Strategy::SpecificationOnly);

        prop_assert!(factory.set_strategy_name(&name).is_err());
        prop_assert_eq!(factory.strategy(), Strategy::SpecificationOnly);
    }

    /// Integer literals parse to their own value at every width that holds them.
    #[test]
    fn integer_literals_parse(n in any::<i16>()) {
        let text = n.to_string();
        prop_assert_eq!(SimpleValueParser::parse("short", &text).expect("short"), Value::Short(n));
        prop_assert_eq!(SimpleValueParser::parse("int", &text).expect("int"), Value::Int(i32::from(n)));
        prop_assert_eq!(SimpleValueParser::parse("long", &text).expect("long"), Value::Long(i64::from(n)));
    }

    /// Simple specifications under a key come back unchanged through the engine.
    #[test]
    fn stored_strings_come_back_verbatim(s in ".{0,24}") {
        let store = MemoryStore::new().with("text", None, BuildSpecification::simple("string", s.clone()));
        let factory = ObjectFactory::new(store, Arc::new(TypeRegistry::new()));
        prop_assert_eq!(factory.create("text").expect("create"), Value::String(s));
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn same_specification_same_array() {
    let spec = BuildSpecification::array("int", 2, int_grid(3, 4));
    let factory = pair_factory();
    let a = factory.interpret(&spec).expect("first");
    let b = factory.interpret(&spec).expect("second");
    assert_eq!(a, b);
}
