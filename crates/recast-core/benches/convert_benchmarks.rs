//! Benchmarks for rule-driven conversion
//!
//! Measures step parsing, key matching and full rule application over
//! records of increasing width.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use recast_core::{is_match, Capabilities, Converter, Record, RuleSet, StepSpec, Value};
use serde_json::json;

fn create_record(width: usize) -> Record {
    let mut record = Record::with_capacity(width * 3);
    for i in 0..width {
        record.insert(format!("name_{}", i), Value::from(format!("  Person {}  ", i)));
        record.insert(format!("phone_{}", i), Value::from(format!("({:03}) 555-{:04}", i % 1000, i)));
        record.insert(format!("amount_{}", i), Value::from(format!("{}.50", i)));
    }
    record
}

fn create_rules() -> RuleSet {
    RuleSet::new()
        .rule("name_*", "trim|singleSpaceBetweenWords|toUpper")
        .rule("phone_*", "bailIfEmpty|onlyNumbers|phone")
        .rule("amount_*", "multiply:3,2|decimals:2")
}

fn bench_step_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_parsing");

    let descriptors = [
        ("single", "trim"),
        ("pipeline", "trim|suffix:yay|toUpper"),
        ("quoted_args", r#"insertEvery:4,"-"|prefix:"a,b""#),
    ];

    for (name, descriptor) in descriptors {
        group.bench_with_input(BenchmarkId::new("compile", name), &descriptor, |b, descriptor| {
            b.iter(|| {
                let spec = StepSpec::from(*descriptor);
                black_box(spec.compile().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");

    let cases = [
        ("exact", "phone_home"),
        ("prefix", "phone_*"),
        ("contains", "*one*"),
    ];

    for (name, pattern) in cases {
        group.bench_with_input(BenchmarkId::new("is_match", name), &pattern, |b, pattern| {
            b.iter(|| black_box(is_match([*pattern], black_box("phone_home"))));
        });
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let rules = create_rules();

    for (name, capabilities) in [
        ("precise", Capabilities::precise()),
        ("float", Capabilities::float_only()),
    ] {
        let converter = Converter::builder().capabilities(capabilities).build();
        for width in [10, 100, 1000] {
            let record = create_record(width);
            group.bench_with_input(BenchmarkId::new(name, width), &record, |b, record| {
                b.iter(|| black_box(converter.apply(record, &rules).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_nested_arrays(c: &mut Criterion) {
    let record = Record::from_json(json!({
        "codes": (0..500)
            .map(|i| json!([format!("a{}", i), [format!("b{}", i), null, ""]]))
            .collect::<Vec<_>>(),
    }))
    .unwrap();
    let rules = RuleSet::new().rule("codes", "bailIfEmpty|onlyNumbers|add:1");
    let converter = Converter::builder().capabilities(Capabilities::precise()).build();

    c.bench_function("nested_arrays", |b| {
        b.iter(|| black_box(converter.apply(&record, &rules).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_step_parsing,
    bench_matching,
    bench_apply,
    bench_nested_arrays
);
criterion_main!(benches);
