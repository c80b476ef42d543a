//! Performance benchmarks for json-sync operations.
//!
//! Run with: cargo bench --package json-sync

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use json_sync::{apply_changes, diff, flatten, flatten_value, rebuild, Change, Receiver};
use serde_json::{json, Value};

// ============================================================================
// Helper functions to generate test data
// ============================================================================

/// Generate a flat document with N fields
fn generate_flat_doc(num_fields: usize) -> Value {
    let mut obj = serde_json::Map::new();
    for i in 0..num_fields {
        obj.insert(format!("field_{}", i), json!(i));
    }
    json!(obj)
}

/// Generate a deeply nested document
fn generate_nested_doc(depth: usize) -> Value {
    let mut current = json!({"value": 42});
    for i in (0..depth).rev() {
        let mut obj = serde_json::Map::new();
        obj.insert(format!("level_{}", i), current);
        current = json!(obj);
    }
    current
}

/// Generate a list of N small records
fn generate_record_list(num_records: usize) -> Value {
    let records: Vec<Value> = (0..num_records)
        .map(|i| json!({"id": i, "name": format!("user_{}", i), "active": i % 2 == 0}))
        .collect();
    json!({ "users": records })
}

/// Modify every tenth field of a flat document
fn touch_tenth(doc: &Value) -> Value {
    let mut updated = doc.clone();
    if let Some(obj) = updated.as_object_mut() {
        for (i, (_, v)) in obj.iter_mut().enumerate() {
            if i % 10 == 0 {
                *v = json!("changed");
            }
        }
    }
    updated
}

// ============================================================================
// Benchmark: flatten
// ============================================================================

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_flat_doc");

    for num_fields in [10, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(num_fields as u64));
        let doc = generate_flat_doc(num_fields);

        group.bench_with_input(
            BenchmarkId::new("serializer", num_fields),
            &num_fields,
            |b, _| b.iter(|| black_box(flatten(black_box(&doc)))),
        );
        group.bench_with_input(
            BenchmarkId::new("walker", num_fields),
            &num_fields,
            |b, _| b.iter(|| black_box(flatten_value(black_box(&doc)))),
        );
    }

    group.finish();
}

fn bench_flatten_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_nested_doc");

    for depth in [5, 10, 20, 50] {
        let doc = generate_nested_doc(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(flatten(black_box(&doc))));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: diff and apply
// ============================================================================

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_flat_doc");

    for num_fields in [10, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(num_fields as u64));

        let doc = generate_flat_doc(num_fields);
        let base = flatten_value(&doc);
        let updated = flatten_value(&touch_tenth(&doc)); // 10% of fields modified

        group.bench_with_input(
            BenchmarkId::from_parameter(num_fields),
            &num_fields,
            |b, _| b.iter(|| black_box(diff(black_box(&base), black_box(&updated)))),
        );
    }

    group.finish();
}

fn bench_apply_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_changes");

    for num_fields in [10, 100, 1000, 10000] {
        let doc = generate_flat_doc(num_fields);
        let base = flatten_value(&doc);
        let changes = diff(&base, &flatten_value(&touch_tenth(&doc)));

        group.bench_with_input(
            BenchmarkId::from_parameter(num_fields),
            &num_fields,
            |b, _| {
                b.iter(|| {
                    let mut state = base.clone();
                    apply_changes(&mut state, black_box(&changes));
                    black_box(state)
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: rebuild
// ============================================================================

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild_record_list");

    for num_records in [10, 100, 1000] {
        group.throughput(Throughput::Elements(num_records as u64));
        let state = flatten_value(&generate_record_list(num_records));

        group.bench_with_input(
            BenchmarkId::new("whole_list", num_records),
            &num_records,
            |b, _| b.iter(|| black_box(rebuild(black_box("users"), &state))),
        );
        group.bench_with_input(
            BenchmarkId::new("single_record", num_records),
            &num_records,
            |b, _| b.iter(|| black_box(rebuild(black_box("users.5"), &state))),
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: receiver notification fan-out
// ============================================================================

fn bench_receiver_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("receiver_apply_with_watchers");

    for num_watchers in [1, 10, 100] {
        let state = flatten_value(&generate_record_list(100));
        let changes = vec![Change::set("users.3.name", "renamed")];

        group.bench_with_input(
            BenchmarkId::from_parameter(num_watchers),
            &num_watchers,
            |b, &n| {
                let mut receiver = Receiver::new();
                receiver.set_state(state.clone());
                for i in 0..n {
                    let _ = receiver.watch_path(format!("users.{}", i), |v| {
                        black_box(v);
                    });
                }
                b.iter(|| black_box(receiver.apply_changes(black_box(&changes))));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_flatten,
    bench_flatten_nested,
    bench_diff,
    bench_apply_changes,
    bench_rebuild,
    bench_receiver_notify,
);

criterion_main!(benches);
