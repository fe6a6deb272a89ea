#![allow(missing_docs)]
//! Benchmarks for batch assembly.
//!
//! Measures the group state machine end to end with the shipped templates:
//! structural map splicing, substitution and technical block serialization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use foxmlgen::{assemble, render, Arrangement, BatchConfig, Row, TagTable};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{child_row, ledger, parent_row, shipped_templates, single_row, TIMESTAMP};

/// `groups` parents with `children` children each.
fn multi_rows(groups: usize, children: usize) -> Vec<Row> {
    let mut rows = Vec::with_capacity(groups * (children + 1));
    let mut line = 2;
    for g in 0..groups {
        rows.push(parent_row(line, &format!("obj-{g}")));
        line += 1;
        for c in 0..children {
            rows.push(child_row(
                line,
                &format!("obj-{g}-{c}"),
                &format!("obj-{g}-{c}.m4v"),
                "00:14:37",
            ));
            line += 1;
        }
    }
    rows
}

/// 100 groups of 4 children.
fn benchmark_multi_row_batch(c: &mut Criterion) {
    let templates = shipped_templates();
    let config = BatchConfig::default();
    let rows = multi_rows(100, 4);

    c.bench_function("assemble_multi_500_rows", |b| {
        b.iter(|| {
            let mut ledger = ledger(rows.len());
            let output = assemble(
                black_box(rows.clone()),
                &mut ledger,
                &templates,
                &config,
                TIMESTAMP,
            )
            .expect("batch assembles");
            output.records().len()
        });
    });
}

/// One group with many children stresses the structural map splice.
fn benchmark_wide_group(c: &mut Criterion) {
    let templates = shipped_templates();
    let config = BatchConfig::default();
    let rows = multi_rows(1, 200);

    c.bench_function("assemble_group_200_children", |b| {
        b.iter(|| {
            let mut ledger = ledger(rows.len());
            assemble(black_box(rows.clone()), &mut ledger, &templates, &config, TIMESTAMP)
                .expect("batch assembles")
        });
    });
}

fn benchmark_single_row_batch(c: &mut Criterion) {
    let templates = shipped_templates();
    let config = BatchConfig {
        arrangement: Arrangement::Single,
        ..Default::default()
    };
    let rows: Vec<Row> = (0..250)
        .map(|i| single_row(i + 2, &format!("tape-{i}"), &format!("tape-{i}.m4v"), "01:02:03"))
        .collect();

    c.bench_function("assemble_single_250_rows", |b| {
        b.iter(|| {
            let mut ledger = ledger(rows.len() * 2);
            assemble(black_box(rows.clone()), &mut ledger, &templates, &config, TIMESTAMP)
                .expect("batch assembles")
        });
    });
}

fn benchmark_render_pass(c: &mut Criterion) {
    let templates = shipped_templates();
    let mut map = render::PlaceholderMap::new();
    for name in templates.umam.placeholders() {
        map.text(&name, "value & more");
    }
    let tags = TagTable::empty();

    c.bench_function("render_child_template", |b| {
        b.iter(|| templates.umam.render(black_box(&map), &tags, "umd:1"));
    });
}

criterion_group!(
    benches,
    benchmark_multi_row_batch,
    benchmark_wide_group,
    benchmark_single_row_batch,
    benchmark_render_pass,
);
criterion_main!(benches);
