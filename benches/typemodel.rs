//! Benchmarks for the deferred type model.
//!
//! Measures the costs a code generator pays per extended type:
//! - Capturing a type with a deep hierarchy
//! - Adding members
//! - Reflection-style queries over declared and inherited members
//! - Interface mapping and override creation

extern crate dotweave;

use criterion::{criterion_group, criterion_main, Criterion};
use dotweave::prelude::*;
use std::{hint::black_box, sync::Arc};

/// Registry with a chain of `depth` classes, each declaring a handful of virtual methods and
/// implementing `System.IDisposable` at the root
fn build_hierarchy(depth: usize) -> (Arc<TypeRegistry>, CilTypeRc, CilTypeRc) {
    let registry = Arc::new(TypeRegistry::new().unwrap());
    let disposable = TypeBuilder::new(&registry)
        .interface("System", "IDisposable")
        .method(|m| m.name("Dispose").public().abstract_virtual())
        .build()
        .unwrap();

    let mut current = TypeBuilder::new(&registry)
        .class("Bench", "Level0")
        .implements(&disposable)
        .default_constructor()
        .method(|m| m.name("Dispose").public().virtual_method())
        .method(|m| m.name("Update").public().virtual_method().param(TypeSignature::I4))
        .build()
        .unwrap();

    for level in 1..depth {
        let name = format!("Level{}", level);
        let method = format!("Step{}", level);
        current = TypeBuilder::new(&registry)
            .class("Bench", &name)
            .extends(&current)
            .default_constructor()
            .method(|m| m.name("Update").public().override_method().param(TypeSignature::I4))
            .method(|m| m.name(method.as_str()).public().virtual_method())
            .field(&format!("state{}", level), FieldAttributes::FAMILY, TypeSignature::I8)
            .build()
            .unwrap();
    }

    (registry, current, disposable)
}

/// Benchmark capturing a type 16 levels deep.
fn bench_model_capture(c: &mut Criterion) {
    let (registry, leaf, _) = build_hierarchy(16);

    c.bench_function("model_capture_depth16", |b| {
        b.iter(|| {
            let model = TypeModel::new(&registry, black_box(&leaf)).unwrap();
            black_box(model)
        });
    });
}

/// Benchmark adding 64 overloads of one method.
fn bench_add_methods(c: &mut Criterion) {
    let (registry, leaf, _) = build_hierarchy(4);
    let params: Vec<Vec<TypeSignature>> = (0..64)
        .map(|count| vec![TypeSignature::I4; count])
        .collect();

    c.bench_function("model_add_methods_64", |b| {
        b.iter(|| {
            let mut model = TypeModel::new(&registry, &leaf).unwrap();
            for (index, params) in params.iter().enumerate() {
                model
                    .add_method(
                        "Overload",
                        MethodAttributes::public(),
                        SignatureMethod::instance(TypeSignature::Void, params.clone()),
                        Some(MethodBody::provided(format!("overload{}", index))),
                    )
                    .unwrap();
            }
            black_box(model)
        });
    });
}

/// Benchmark listing all public instance methods of a deep type.
fn bench_get_methods(c: &mut Criterion) {
    let (registry, leaf, _) = build_hierarchy(16);
    let model = TypeModel::new(&registry, &leaf).unwrap();
    let flags = BindingFlags::PUBLIC | BindingFlags::INSTANCE;

    c.bench_function("model_get_methods_depth16", |b| {
        b.iter(|| {
            let methods = model.get_methods(black_box(flags));
            black_box(methods.len())
        });
    });
}

/// Benchmark a single-member lookup by name.
fn bench_get_method(c: &mut Criterion) {
    let (registry, leaf, _) = build_hierarchy(16);
    let model = TypeModel::new(&registry, &leaf).unwrap();
    let flags = BindingFlags::PUBLIC | BindingFlags::INSTANCE;

    c.bench_function("model_get_method_by_name", |b| {
        b.iter(|| {
            let method = model.get_method(black_box("Step3"), flags).unwrap();
            black_box(method.is_some())
        });
    });
}

/// Benchmark mapping an inherited interface.
fn bench_interface_map(c: &mut Criterion) {
    let (registry, leaf, disposable) = build_hierarchy(16);
    let model = TypeModel::new(&registry, &leaf).unwrap();

    c.bench_function("model_interface_map_depth16", |b| {
        b.iter(|| {
            let mapping = model.get_interface_map(black_box(&disposable)).unwrap();
            black_box(mapping)
        });
    });
}

/// Benchmark overriding a slot defined at the root of a deep hierarchy.
fn bench_get_or_add_override(c: &mut Criterion) {
    let (registry, leaf, _) = build_hierarchy(16);
    let root = registry
        .get_by_fullname("Bench.Level0")
        .and_then(|level| level.method_by_name("Dispose"))
        .unwrap();

    c.bench_function("model_override_depth16", |b| {
        b.iter(|| {
            let mut model = TypeModel::new(&registry, &leaf).unwrap();
            let id = model.get_or_add_override(black_box(&root)).unwrap();
            black_box(id)
        });
    });
}

criterion_group!(
    benches,
    bench_model_capture,
    bench_add_methods,
    bench_get_methods,
    bench_get_method,
    bench_interface_map,
    bench_get_or_add_override
);
criterion_main!(benches);
