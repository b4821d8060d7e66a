//! # Factory Benchmarks
//!
//! Performance benchmarks for the objfactory-core construction paths.
//!
//! Run with: `cargo bench -p objfactory-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use objfactory_core::{
    BuildSpecification, ClassDef, ConfigStore, MemoryStore, ObjectFactory, Parameter, Primitive,
    Strategy, TypeDescriptor, TypeRegistry, Value,
};
use std::hint::black_box;
use std::sync::Arc;

#[derive(Debug)]
struct Node {
    depth: i32,
    _child: Option<Arc<Node>>,
}

/// A registry whose `bench.Node` has several overloads; the exact match is declared last.
fn registry() -> Arc<TypeRegistry> {
    let node = ClassDef::builder("bench.Node")
        .initializer([TypeDescriptor::String], |_| {
            Ok(Node { depth: -1, _child: None })
        })
        .initializer([Primitive::Long.into()], |args| {
            Ok(Node { depth: args.long(0)? as i32, _child: None })
        })
        .initializer([Primitive::Int.into()], |args| {
            Ok(Node { depth: args.int(0)?, _child: None })
        })
        .initializer([Primitive::Int.into(), TypeDescriptor::Any], |args| {
            let child = args
                .optional_object::<Node>(1)?
                .map(|n| Arc::new(Node { depth: n.depth, _child: None }));
            Ok(Node { depth: args.int(0)?, _child: child })
        })
        .build();
    Arc::new(TypeRegistry::new().with(node))
}

/// A chain of nested complex specifications `depth` levels deep.
fn chain(depth: usize) -> BuildSpecification {
    let mut spec = BuildSpecification::complex(
        "bench.Node",
        vec![BuildSpecification::simple("int", "0").into()],
    );
    for level in 1..depth {
        spec = BuildSpecification::complex(
            "bench.Node",
            vec![
                BuildSpecification::simple("int", level.to_string()).into(),
                spec.into(),
            ],
        );
    }
    spec
}

fn grid(size: usize) -> BuildSpecification {
    let rows = (0..size)
        .map(|r| {
            Parameter::Nested(
                (0..size)
                    .map(|c| Parameter::spec(BuildSpecification::simple("int", (r + c).to_string())))
                    .collect(),
            )
        })
        .collect();
    BuildSpecification::array("int", 2, rows)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_exact_match(c: &mut Criterion) {
    let factory = ObjectFactory::new(MemoryStore::new(), registry());
    let args = [Value::Int(1)];
    let types = [TypeDescriptor::from(Primitive::Int)];

    c.bench_function("exact_match", |b| {
        b.iter(|| {
            black_box(factory.create_full(
                "bench.Node",
                None,
                None,
                Some(&args),
                Some(&types),
                Strategy::ReflectionOnly,
            ))
        });
    });
}

fn bench_backtracking(c: &mut Criterion) {
    let factory = ObjectFactory::new(MemoryStore::new(), registry());
    let args = [Value::Int(1)];
    let types = [TypeDescriptor::Any];

    c.bench_function("backtracking", |b| {
        b.iter(|| {
            black_box(factory.create_full(
                "bench.Node",
                None,
                None,
                Some(&args),
                Some(&types),
                Strategy::ReflectionOnly,
            ))
        });
    });
}

fn bench_nested_specifications(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_specifications");
    let factory = ObjectFactory::new(MemoryStore::new(), registry());

    for depth in [1, 10, 100].iter() {
        let spec = chain(*depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| black_box(factory.interpret(&spec)));
        });
    }

    group.finish();
}

fn bench_array_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_build");
    let factory = ObjectFactory::new(MemoryStore::new(), registry());

    for size in [4, 32, 128].iter() {
        let spec = grid(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(factory.interpret(&spec)));
        });
    }

    group.finish();
}

fn bench_config_store_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_store_load");

    for entries in [10, 100, 1000].iter() {
        let mut text = String::new();
        for i in 0..*entries {
            text.push_str(&format!(
                "[\"bench.Node:n{i}\"]\ntype = \"bench.Node\"\nparams = [ {{ type = \"int\", value = {i} }} ]\n\n"
            ));
        }
        group.bench_with_input(BenchmarkId::from_parameter(entries), entries, |b, _| {
            b.iter(|| black_box(ConfigStore::from_toml_str(&text)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exact_match,
    bench_backtracking,
    bench_nested_specifications,
    bench_array_build,
    bench_config_store_load,
);

criterion_main!(benches);
