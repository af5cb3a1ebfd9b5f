//! Wire format benchmarks.
//!
//! One line is formatted per frame (50 Hz on the target), parsing runs on
//! the receiver for every line.

use criterion::{Criterion, criterion_group, criterion_main};
use razmer_common::format::{AxisFormat, DefaultFormat, Layout};
use razmer_common::link::LineAssembler;
use std::hint::black_box;

fn bench_format_default(c: &mut Criterion) {
    let axis = [123_456, -123_456, 0, 42];
    c.bench_function("format_default_4x6.2", |b| {
        b.iter(|| DefaultFormat::format(black_box(&axis)));
    });
}

fn bench_format_wide(c: &mut Criterion) {
    let axis = [1_234_567, -7_654_321, 42, 9_999_999, -1];
    c.bench_function("format_5x7.4", |b| {
        b.iter(|| AxisFormat::<5, 7, 4>::format(black_box(&axis)));
    });
}

fn bench_format_runtime_layout(c: &mut Criterion) {
    let layout = Layout::DEFAULT;
    let axis = [123_456, -123_456, 0, 42];
    c.bench_function("format_runtime_layout", |b| {
        b.iter(|| layout.format(black_box(&axis)));
    });
}

fn bench_parse_default(c: &mut Criterion) {
    let line = DefaultFormat::format(&[123_456, -123_456, 0, 42]);
    c.bench_function("parse_default_4x6.2", |b| {
        b.iter(|| DefaultFormat::parse(black_box(&line)).unwrap());
    });
}

fn bench_assemble_line(c: &mut Criterion) {
    let line = DefaultFormat::format(&[123_456, -123_456, 0, 42]);
    let mut rx = LineAssembler::new();
    c.bench_function("assemble_line", |b| {
        b.iter(|| rx.push_bytes(black_box(line.as_bytes())));
    });
}

criterion_group!(
    benches,
    bench_format_default,
    bench_format_wide,
    bench_format_runtime_layout,
    bench_parse_default,
    bench_assemble_line,
);
criterion_main!(benches);
