//! Span query benchmarks.
//!
//! Measures overlap lookups against documents carrying tens of thousands of
//! annotations, the cost of loading layers of that size, and the fragment
//! operations that sit on top of them.
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench overlap_query
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tessera::prelude::*;
use tessera::SpanIndex;

const WORD: &str = "lorem ";

/// One token per word, one sentence per twenty words, one entity per seven.
fn layered_document(words: usize) -> Document {
    let text = WORD.repeat(words);
    let mut doc = Document::new(Arc::new(TypeRegistry::new()), "bench", text.trim_end());
    let width = WORD.len();
    for i in 0..words {
        let start = i * width;
        doc.create_annotation(builtin::TOKEN, start, start + width - 1, AttributeMap::new())
            .unwrap();
    }
    for i in (0..words).step_by(20) {
        let last = (i + 19).min(words - 1);
        doc.create_annotation(
            builtin::SENTENCE,
            i * width,
            last * width + width - 1,
            AttributeMap::new(),
        )
        .unwrap();
    }
    for i in (0..words.saturating_sub(2)).step_by(7) {
        doc.create_annotation(
            builtin::ENTITY,
            i * width,
            (i + 2) * width + width - 1,
            AttributeMap::new(),
        )
        .unwrap();
    }
    doc
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_index");

    for &size in &[1_000usize, 10_000, 50_000] {
        let mut index = SpanIndex::new();
        for i in 0..size {
            let start = (i * 7) % (size * 4);
            index.insert(AnnotationId::new(i as i64), Span::new(start, start + 12).unwrap());
        }
        let query = Span::new(size * 2, size * 2 + 40).unwrap();
        // Force the lazy rebuild outside the measured loop
        black_box(index.query_overlap(query));

        group.bench_with_input(BenchmarkId::new("overlap", size), &query, |b, q| {
            b.iter(|| black_box(index.query_overlap(black_box(*q))))
        });
        group.bench_with_input(BenchmarkId::new("containing", size), &query, |b, q| {
            b.iter(|| black_box(index.query_containing(black_box(*q))))
        });
        group.bench_with_input(BenchmarkId::new("contained_in", size), &query, |b, q| {
            b.iter(|| black_box(index.query_contained_in(black_box(*q))))
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_build");
    group.sample_size(10);

    for &words in &[10_000usize, 50_000] {
        group.bench_with_input(BenchmarkId::new("layered", words), &words, |b, &n| {
            b.iter(|| black_box(layered_document(n)))
        });
    }
    group.finish();
}

fn bench_fragments(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragments");
    group.sample_size(20);

    let doc = layered_document(20_000);
    let middle = doc.hstring().substring(60_000, 60_120).unwrap();
    black_box(doc.hstring().tokens().len());

    group.bench_function("tokens_in_window", |b| {
        b.iter(|| black_box(middle.tokens().len()))
    });
    group.bench_function("entities_in_window", |b| {
        b.iter(|| black_box(middle.annotations(builtin::ENTITY).len()))
    });
    group.bench_function("left_context_5", |b| {
        b.iter(|| black_box(middle.left_context(builtin::TOKEN, 5)))
    });
    group.bench_function("interleaved_entities", |b| {
        b.iter(|| black_box(middle.interleaved(&[builtin::ENTITY]).len()))
    });

    group.finish();
}

criterion_group!(benches, bench_index, bench_build, bench_fragments);
criterion_main!(benches);
