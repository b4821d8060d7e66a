//! # Object Factory
//!
//! The construction engine.
//!
//! An [`ObjectFactory`] owns a specification store, the default type
//! registry, a catalog of code bundles and a default [`Strategy`]. Every
//! `create*` operation reduces to one canonical form:
//!
//! 1. Validate the call (non-blank key and identifier, consistent arguments).
//! 2. `ReflectionOnly`: resolve the key as a type name and pick an initializer.
//! 3. Otherwise look the key up in the store. A hit is interpreted. An unknown
//!    reference fails under `SpecificationOnly` and falls back to step 2
//!    under `Both`.
//! 4. Type-keyed forms finally check that the result fits the requested type.

use crate::array_builder::ArrayBuilder;
use crate::constructor::ConstructorResolver;
use crate::loading::{BundleCatalog, LoadingContext};
use crate::registry::TypeRegistry;
use crate::resolver::TypeResolver;
use crate::simple::SimpleValueParser;
use crate::specification::{BuildSpecification, Parameter, SpecKind};
use crate::store::{LookupError, SpecificationStore};
use crate::strategy::Strategy;
use crate::types::{ConstructionError, FactoryError, TypeDescriptor, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// Builds objects from specifications or registered initializers.
#[derive(Debug)]
pub struct ObjectFactory<S> {
    store: S,
    resolver: TypeResolver,
    bundles: BundleCatalog,
    strategy: Strategy,
}

impl<S: SpecificationStore> ObjectFactory<S> {
    /// Create a factory with the default strategy (`Both`).
    pub fn new(store: S, registry: Arc<TypeRegistry>) -> Self {
        Self::with_strategy(store, registry, Strategy::default())
    }

    /// Create a factory with an explicit default strategy.
    pub fn with_strategy(store: S, registry: Arc<TypeRegistry>, strategy: Strategy) -> Self {
        Self {
            store,
            resolver: TypeResolver::new(registry),
            bundles: BundleCatalog::new(),
            strategy,
        }
    }

    /// Attach the code bundles specifications may name.
    #[must_use]
    pub fn with_bundles(mut self, bundles: BundleCatalog) -> Self {
        self.bundles = bundles;
        self
    }

    /// The current default strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Change the default strategy.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Change the default strategy by name. An unknown name leaves the
    /// current strategy untouched.
    pub fn set_strategy_name(&mut self, name: &str) -> Result<(), FactoryError> {
        self.strategy = name.parse()?;
        Ok(())
    }

    /// The specification store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The default type registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        self.resolver.registry()
    }

    /// The code bundles this factory can load.
    pub fn bundles(&self) -> &BundleCatalog {
        &self.bundles
    }

    // =========================================================================
    // KEY-BASED CREATION
    // =========================================================================

    /// Create the object registered under `key`.
    pub fn create(&self, key: &str) -> Result<Value, FactoryError> {
        self.create_full(key, None, None, None, None, self.strategy)
    }

    /// Create the object registered under `key` and `identifier`.
    pub fn create_with_id(&self, key: &str, identifier: &str) -> Result<Value, FactoryError> {
        self.create_full(key, Some(identifier), None, None, None, self.strategy)
    }

    /// Canonical creation.
    ///
    /// `context` replaces the default registry when the key is treated as a
    /// type name. `args` without `arg_types` infers the types from the
    /// arguments, which then must not be null.
    pub fn create_full(
        &self,
        key: &str,
        identifier: Option<&str>,
        context: Option<&LoadingContext>,
        args: Option<&[Value]>,
        arg_types: Option<&[TypeDescriptor]>,
        strategy: Strategy,
    ) -> Result<Value, FactoryError> {
        let call = Call::validate(key, identifier, args, arg_types)?;
        self.run(&call, Context::Given(context), strategy)
    }

    /// Canonical creation with the context loaded from a code location.
    ///
    /// The location is only loaded when the key is built from initializers.
    pub fn create_full_at(
        &self,
        key: &str,
        identifier: Option<&str>,
        code_location: Option<&str>,
        args: Option<&[Value]>,
        arg_types: Option<&[TypeDescriptor]>,
        strategy: Strategy,
    ) -> Result<Value, FactoryError> {
        let call = Call::validate(key, identifier, args, arg_types)?;
        self.run(&call, Context::At(code_location), strategy)
    }

    // =========================================================================
    // TYPE-BASED CREATION
    // =========================================================================

    /// Create an instance of `ty`, keyed by its name.
    pub fn create_type(&self, ty: &TypeDescriptor) -> Result<Value, FactoryError> {
        self.create_type_full(ty, None, None, None, None, self.strategy)
    }

    /// Create an instance of `ty` registered under `identifier`.
    pub fn create_type_with_id(
        &self,
        ty: &TypeDescriptor,
        identifier: &str,
    ) -> Result<Value, FactoryError> {
        self.create_type_full(ty, Some(identifier), None, None, None, self.strategy)
    }

    /// Type-keyed [`create_full`](Self::create_full). The result (or, for
    /// arrays, its element type) must be assignable to `ty`.
    pub fn create_type_full(
        &self,
        ty: &TypeDescriptor,
        identifier: Option<&str>,
        context: Option<&LoadingContext>,
        args: Option<&[Value]>,
        arg_types: Option<&[TypeDescriptor]>,
        strategy: Strategy,
    ) -> Result<Value, FactoryError> {
        let value = self.create_full(&ty.name(), identifier, context, args, arg_types, strategy)?;
        check_assignable(ty, value)
    }

    /// Type-keyed [`create_full_at`](Self::create_full_at).
    pub fn create_type_full_at(
        &self,
        ty: &TypeDescriptor,
        identifier: Option<&str>,
        code_location: Option<&str>,
        args: Option<&[Value]>,
        arg_types: Option<&[TypeDescriptor]>,
        strategy: Strategy,
    ) -> Result<Value, FactoryError> {
        let value =
            self.create_full_at(&ty.name(), identifier, code_location, args, arg_types, strategy)?;
        check_assignable(ty, value)
    }

    // =========================================================================
    // INTERPRETER
    // =========================================================================

    /// Build the value a specification describes.
    pub fn interpret(&self, spec: &BuildSpecification) -> Result<Value, ConstructionError> {
        self.interpret_typed(spec).map(|(value, _)| value)
    }

    /// Build a value together with the type its specification declares.
    fn interpret_typed(
        &self,
        spec: &BuildSpecification,
    ) -> Result<(Value, TypeDescriptor), ConstructionError> {
        match spec.kind() {
            SpecKind::Null => Ok((Value::Null, TypeDescriptor::Null)),
            SpecKind::Simple => {
                let text = spec.value().ok_or_else(|| ConstructionError::EmptyValue {
                    type_name: spec.type_name().to_string(),
                })?;
                let value = SimpleValueParser::parse(spec.type_name(), text)?;
                let ty = self.resolver.resolve(spec.type_name(), None)?;
                Ok((value, ty))
            }
            SpecKind::Complex => {
                let context = self.load_context(spec.code_location())?;
                let mut values = Vec::with_capacity(spec.parameters().len());
                let mut types = Vec::with_capacity(spec.parameters().len());
                for parameter in spec.parameters() {
                    let (value, ty) = match parameter {
                        Parameter::Spec(nested) => self.interpret_typed(nested)?,
                        Parameter::Value(value) => (value.clone(), value.runtime_type()),
                        Parameter::Nested(_) => return Err(ConstructionError::UnexpectedNesting),
                    };
                    values.push(value);
                    types.push(ty);
                }
                let ty = self.resolver.resolve(spec.type_name(), context.as_ref())?;
                let value = ConstructorResolver::construct(&ty, &values, &types)?;
                Ok((value, ty))
            }
            SpecKind::Array => {
                let context = self.load_context(spec.code_location())?;
                let element = self.resolver.resolve(spec.type_name(), context.as_ref())?;
                let array = ArrayBuilder::build(
                    spec.type_name(),
                    &element,
                    spec.dimension(),
                    spec.parameters(),
                    |nested| self.interpret(nested),
                )?;
                let ty = TypeDescriptor::array(element, spec.dimension().max(1));
                Ok((Value::Array(array), ty))
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn run(
        &self,
        call: &Call<'_>,
        context: Context<'_>,
        strategy: Strategy,
    ) -> Result<Value, FactoryError> {
        if !strategy.uses_store() {
            tracing::debug!(key = call.key, %strategy, "constructing by initializer");
            return self.construct_directly(call, context);
        }

        match self.store.get(call.key, call.identifier) {
            Ok(spec) => {
                tracing::debug!(key = call.key, identifier = call.identifier, kind = %spec.kind(), "interpreting specification");
                Ok(self.interpret(&spec)?)
            }
            Err(e @ LookupError::UnknownReference { .. }) if strategy == Strategy::Both => {
                tracing::debug!(key = call.key, reason = %e, "no specification, falling back to initializers");
                self.construct_directly(call, context)
            }
            Err(e) => Err(ConstructionError::Lookup(e).into()),
        }
    }

    /// Resolve the key as a type. A code location is only loaded here, so a
    /// store hit never touches the bundle catalog.
    fn construct_directly(
        &self,
        call: &Call<'_>,
        context: Context<'_>,
    ) -> Result<Value, FactoryError> {
        let loaded;
        let context = match context {
            Context::Given(context) => context,
            Context::At(location) => {
                loaded = self.load_context(location)?;
                loaded.as_ref()
            }
        };
        let ty = self.resolver.resolve(call.key, context)?;
        Ok(ConstructorResolver::construct(&ty, call.args, &call.arg_types)?)
    }

    fn load_context(
        &self,
        code_location: Option<&str>,
    ) -> Result<Option<LoadingContext>, ConstructionError> {
        code_location
            .map(|location| self.bundles.load(location, self.resolver.registry()))
            .transpose()
    }
}

/// Where a direct construction looks up its type.
#[derive(Clone, Copy)]
enum Context<'a> {
    Given(Option<&'a LoadingContext>),
    At(Option<&'a str>),
}

/// A validated creation request.
struct Call<'a> {
    key: &'a str,
    identifier: Option<&'a str>,
    args: &'a [Value],
    arg_types: Cow<'a, [TypeDescriptor]>,
}

impl<'a> Call<'a> {
    fn validate(
        key: &'a str,
        identifier: Option<&'a str>,
        args: Option<&'a [Value]>,
        arg_types: Option<&'a [TypeDescriptor]>,
    ) -> Result<Self, FactoryError> {
        if key.trim().is_empty() {
            return Err(FactoryError::InvalidArgument(
                "the key should not be empty".to_string(),
            ));
        }
        if identifier.is_some_and(|id| id.trim().is_empty()) {
            return Err(FactoryError::InvalidArgument(
                "the identifier should not be empty".to_string(),
            ));
        }

        let (args, arg_types) = match (args, arg_types) {
            (None, None) => (&[][..], Cow::Borrowed(&[][..])),
            (Some(args), None) => {
                if args.iter().any(Value::is_null) {
                    return Err(FactoryError::InvalidArgument(
                        "the arguments contain null, their types can not be inferred".to_string(),
                    ));
                }
                let inferred = args.iter().map(Value::runtime_type).collect::<Vec<_>>();
                (args, Cow::Owned(inferred))
            }
            (Some(args), Some(types)) if args.len() == types.len() => (args, Cow::Borrowed(types)),
            _ => {
                return Err(FactoryError::InvalidArgument(
                    "the arguments and their types should be compatible".to_string(),
                ));
            }
        };

        Ok(Self {
            key,
            identifier,
            args,
            arg_types,
        })
    }
}

/// Check a type-keyed result: arrays are judged by their element type, and
/// null passes for every reference type.
fn check_assignable(ty: &TypeDescriptor, value: Value) -> Result<Value, FactoryError> {
    let actual = match &value {
        Value::Array(array) => array.element_type().clone(),
        other => other.runtime_type(),
    };
    if ty.is_assignable_from(&actual) {
        Ok(value)
    } else {
        Err(ConstructionError::NotAssignable {
            expected: ty.name(),
            actual: value.runtime_type().name(),
        }
        .into())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClassDef;
    use crate::store::MemoryStore;
    use crate::types::Primitive;

    #[derive(Debug, PartialEq)]
    struct Counter(i32);

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new().with(
                ClassDef::builder("demo.Counter")
                    .initializer([], |_| Ok(Counter(0)))
                    .initializer([Primitive::Int.into()], |args| Ok(Counter(args.int(0)?)))
                    .build(),
            ),
        )
    }

    fn factory() -> ObjectFactory<MemoryStore> {
        let store = MemoryStore::new()
            .with(
                "demo.Counter",
                Some("ten"),
                BuildSpecification::complex(
                    "demo.Counter",
                    vec![BuildSpecification::simple("int", "10").into()],
                ),
            )
            .with("answer", None, BuildSpecification::simple("int", "42"));
        ObjectFactory::new(store, registry())
    }

    fn counter(value: &Value) -> Option<i32> {
        value.downcast_ref::<Counter>().map(|c| c.0)
    }

    #[test]
    fn specification_and_fallback() {
        let factory = factory();
        let ten = factory.create_with_id("demo.Counter", "ten").expect("spec");
        assert_eq!(counter(&ten), Some(10));

        let zero = factory.create("demo.Counter").expect("fallback");
        assert_eq!(counter(&zero), Some(0));

        assert_eq!(factory.create("answer").expect("simple"), Value::Int(42));
    }

    #[test]
    fn reflection_only_ignores_the_store() {
        let factory = factory();
        let err = factory
            .create_full("answer", None, None, None, None, Strategy::ReflectionOnly)
            .expect_err("answer is not a type");
        assert!(matches!(
            err.construction(),
            Some(ConstructionError::TypeNotFound(_))
        ));
    }

    #[test]
    fn inferred_argument_types() {
        let factory = factory();
        let args = [Value::Int(5)];
        let value = factory
            .create_full("demo.Counter", None, None, Some(&args), None, Strategy::Both)
            .expect("create");
        assert_eq!(counter(&value), Some(5));
    }

    #[test]
    fn argument_validation() {
        let factory = factory();
        let int = [TypeDescriptor::from(Primitive::Int)];
        let null = [Value::Null];
        let pair = [Value::Int(1), Value::Int(2)];
        let cases: [(Option<&[Value]>, Option<&[TypeDescriptor]>); 3] = [
            (Some(&null), None),
            (None, Some(&int)),
            (Some(&pair), Some(&int)),
        ];
        for (args, types) in cases {
            assert!(matches!(
                factory.create_full("demo.Counter", None, None, args, types, Strategy::Both),
                Err(FactoryError::InvalidArgument(_))
            ));
        }
        assert!(matches!(
            factory.create_with_id("demo.Counter", " "),
            Err(FactoryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn set_strategy_name_keeps_old_value_on_error() {
        let mut factory = factory();
        factory
            .set_strategy_name("specification")
            .expect("valid name");
        assert_eq!(factory.strategy(), Strategy::SpecificationOnly);
        assert!(factory.set_strategy_name("sometimes").is_err());
        assert_eq!(factory.strategy(), Strategy::SpecificationOnly);
    }

    #[test]
    fn type_keyed_results_are_checked() {
        let factory = factory();
        let counter_type = factory
            .registry()
            .resolve("demo.Counter")
            .expect("registered");
        assert!(factory.create_type(&counter_type).is_ok());

        let int: TypeDescriptor = Primitive::Int.into();
        let store = MemoryStore::new().with("int", None, BuildSpecification::simple("string", "x"));
        let mismatched = ObjectFactory::new(store, registry());
        assert!(matches!(
            mismatched.create_type(&int),
            Err(FactoryError::Construction(ConstructionError::NotAssignable { .. }))
        ));
    }

    #[test]
    fn unknown_bundle_is_a_construction_failure() {
        let factory = factory();
        let err = factory
            .create_full_at(
                "demo.Counter",
                None,
                Some("bundle://missing"),
                None,
                None,
                Strategy::ReflectionOnly,
            )
            .expect_err("missing bundle");
        assert!(matches!(
            err.construction(),
            Some(ConstructionError::BundleUnavailable(_))
        ));
    }

    #[test]
    fn builtin_string_by_type() {
        let factory = factory();
        assert_eq!(
            factory.create_type(&TypeDescriptor::String).expect("empty string"),
            Value::from("")
        );
        let args = [Value::from("copy")];
        let value = factory
            .create_full("string", None, None, Some(&args), None, Strategy::ReflectionOnly)
            .expect("copied string");
        assert_eq!(value, Value::from("copy"));
    }

    #[test]
    fn stored_specification_ignores_the_code_location() {
        let factory = factory();
        let value = factory
            .create_full_at(
                "demo.Counter",
                Some("ten"),
                Some("bundle://nowhere"),
                None,
                None,
                Strategy::SpecificationOnly,
            )
            .expect("store hit");
        assert_eq!(counter(&value), Some(10));
    }
}
