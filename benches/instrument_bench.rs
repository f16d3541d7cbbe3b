/// Benchmarks for the rectrace instrumentation pipeline.
///
/// Run with: `cargo bench`
///
/// Measures parse + locate + instrument + synthesize over synthetic source
/// units of growing size. Nothing is compiled or executed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rectrace::application::{prepare, TraceOptions};
use rectrace::domain::instrument::instrument;
use rectrace::domain::locate::locate;
use rectrace::domain::tree::SyntaxTree;

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// A source unit with `fillers` unrelated functions followed by one
/// recursive target with `branches` self-calls.
fn synthetic_source(fillers: usize, branches: usize) -> String {
    let mut src = String::new();
    for i in 0..fillers {
        src.push_str(&format!(
            "fn filler_{i}(x: u64) -> u64 {{ let y = x * {i}; if y > 10 {{ y - 1 }} else {{ y + 1 }} }}\n"
        ));
    }
    let calls: Vec<String> = (1..=branches).map(|k| format!("walk(n - {k})")).collect();
    src.push_str(&format!(
        "fn walk(n: u64) -> u64 {{ if n < {branches} {{ return 1; }} {} }}\n",
        calls.join(" + ")
    ));
    src
}

// ═══════════════════════════════════════════════════════════════════════════
// Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_instrument(c: &mut Criterion) {
    let mut group = c.benchmark_group("instrument");

    for &fillers in &[10usize, 100, 1000] {
        let source = synthetic_source(fillers, 4);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_and_instrument", fillers), &source, |b, src| {
            b.iter(|| {
                let mut tree = SyntaxTree::parse(black_box(src)).unwrap();
                let mut handle = locate(&mut tree, "walk").unwrap();
                let report = instrument(&mut handle).unwrap();
                black_box(report);
            })
        });
    }

    group.finish();
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");

    for &branches in &[2usize, 16, 64] {
        let source = synthetic_source(10, branches);
        let options = TraceOptions {
            function: "walk".to_string(),
            arguments: vec!["20".to_string()],
            include_context: true,
        };
        group.bench_with_input(BenchmarkId::new("self_calls", branches), &source, |b, src| {
            b.iter(|| black_box(prepare(black_box(src), &options).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_instrument, bench_prepare);
criterion_main!(benches);
