//! # Demo Type Catalog
//!
//! The classes the CLI can construct.
//!
//! - `geometry.Point`, `geometry.Segment`, `geometry.Polygon`
//! - `people.Person`, `people.Team`
//! - `shapes.Circle`, only visible through the `bundle://shapes` code bundle

use objfactory_core::{
    BundleCatalog, ClassDef, Instance, Primitive, TypeDescriptor, TypeRegistry, Value,
};
use serde::Serialize;
use std::sync::Arc;

/// Code location of the shapes bundle.
pub const SHAPES_BUNDLE: &str = "bundle://shapes";

// =============================================================================
// DEMO TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Circle {
    pub center: Point,
    pub radius: i64,
}

// =============================================================================
// REGISTRY
// =============================================================================

fn point_class() -> Arc<ClassDef> {
    ClassDef::builder("geometry.Point")
        .initializer([], |_| Ok(Point { x: 0, y: 0 }))
        .initializer([Primitive::Int.into(), Primitive::Int.into()], |args| {
            Ok(Point {
                x: args.int(0)?,
                y: args.int(1)?,
            })
        })
        .build()
}

/// Collect the objects of an array argument, rejecting null elements.
fn elements<T: Clone + 'static>(array: &[Value], what: &str) -> Result<Vec<T>, objfactory_core::BoxError> {
    array
        .iter()
        .map(|v| {
            v.downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| format!("every {what} must be present").into())
        })
        .collect()
}

/// The default namespace of the CLI.
pub fn registry() -> Arc<TypeRegistry> {
    let point = point_class();
    let point_ty = TypeDescriptor::from(Arc::clone(&point));

    let segment = ClassDef::builder("geometry.Segment")
        .initializer([point_ty.clone(), point_ty.clone()], |args| {
            Ok(Segment {
                start: args.object::<Point>(0)?.clone(),
                end: args.object::<Point>(1)?.clone(),
            })
        })
        .build();

    let polygon = ClassDef::builder("geometry.Polygon")
        .initializer([TypeDescriptor::array(point_ty, 1)], |args| {
            Ok(Polygon {
                vertices: elements(args.array(0)?.values(), "vertex")?,
            })
        })
        .build();

    let person = ClassDef::builder("people.Person")
        .initializer([TypeDescriptor::String, Primitive::Int.into()], |args| {
            let age = args.int(1)?;
            if age < 0 {
                return Err(format!("age {age} is negative").into());
            }
            Ok(Person {
                name: args.string(0)?.to_string(),
                age,
            })
        })
        .initializer([TypeDescriptor::String], |args| {
            Ok(Person {
                name: args.string(0)?.to_string(),
                age: 0,
            })
        })
        .build();
    let person_ty = TypeDescriptor::from(Arc::clone(&person));

    let team = ClassDef::builder("people.Team")
        .initializer(
            [TypeDescriptor::String, TypeDescriptor::array(person_ty, 1)],
            |args| {
                Ok(Team {
                    name: args.string(0)?.to_string(),
                    members: elements(args.array(1)?.values(), "member")?,
                })
            },
        )
        .build();

    Arc::new(
        TypeRegistry::new()
            .with(point)
            .with(segment)
            .with(polygon)
            .with(person)
            .with(team),
    )
}

/// Code bundles the CLI knows about.
pub fn bundles(registry: &Arc<TypeRegistry>) -> BundleCatalog {
    let point_ty = registry
        .resolve("geometry.Point")
        .unwrap_or(TypeDescriptor::Any);

    BundleCatalog::new().with(SHAPES_BUNDLE, move || {
        let circle = ClassDef::builder("shapes.Circle")
            .initializer([point_ty.clone(), Primitive::Long.into()], |args| {
                Ok(Circle {
                    center: args.object::<Point>(0)?.clone(),
                    radius: args.long(1)?,
                })
            })
            .build();
        TypeRegistry::new().with(circle)
    })
}

// =============================================================================
// DESCRIPTION
// =============================================================================

/// Serialize a catalog object, if `instance` holds one.
pub fn describe(instance: &Instance) -> Option<serde_json::Value> {
    fn json<T: Serialize>(object: &T) -> Option<serde_json::Value> {
        serde_json::to_value(object).ok()
    }

    if let Some(p) = instance.downcast_ref::<Point>() {
        return json(p);
    }
    if let Some(s) = instance.downcast_ref::<Segment>() {
        return json(s);
    }
    if let Some(p) = instance.downcast_ref::<Polygon>() {
        return json(p);
    }
    if let Some(p) = instance.downcast_ref::<Person>() {
        return json(p);
    }
    if let Some(t) = instance.downcast_ref::<Team>() {
        return json(t);
    }
    instance.downcast_ref::<Circle>().and_then(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objfactory_core::{MemoryStore, ObjectFactory, Strategy};

    fn factory() -> ObjectFactory<MemoryStore> {
        let registry = registry();
        let bundles = bundles(&registry);
        ObjectFactory::new(MemoryStore::new(), registry).with_bundles(bundles)
    }

    #[test]
    fn point_without_arguments_is_origin() {
        let value = factory().create("geometry.Point").expect("point");
        assert_eq!(value.downcast_ref::<Point>(), Some(&Point { x: 0, y: 0 }));
    }

    #[test]
    fn person_rejects_negative_age() {
        let args = [Value::from("Ada"), Value::Int(-1)];
        let result = factory().create_full(
            "people.Person",
            None,
            None,
            Some(&args),
            None,
            Strategy::ReflectionOnly,
        );
        assert!(result.is_err());
    }

    #[test]
    fn circle_lives_in_the_shapes_bundle() {
        let factory = factory();
        let center = factory.create("geometry.Point").expect("point");
        let args = [center, Value::Long(3)];
        let types = [
            factory.registry().resolve("geometry.Point").expect("point type"),
            Primitive::Long.into(),
        ];

        assert!(factory.create("shapes.Circle").is_err());
        let circle = factory
            .create_full_at(
                "shapes.Circle",
                None,
                Some(SHAPES_BUNDLE),
                Some(&args),
                Some(&types),
                Strategy::ReflectionOnly,
            )
            .expect("circle");
        assert_eq!(circle.downcast_ref::<Circle>().map(|c| c.radius), Some(3));
    }

    #[test]
    fn describe_serializes_catalog_objects() {
        let value = factory().create("geometry.Point").expect("point");
        let instance = value.as_instance().expect("instance");
        assert_eq!(describe(instance), Some(serde_json::json!({ "x": 0, "y": 0 })));
    }
}
