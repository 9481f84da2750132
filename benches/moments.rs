//! Benchmarks for topic extraction and key moment selection.
//!
//! Measures the transcript analysis path of `findKeyMoments` on synthetic
//! transcripts of increasing length.

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use meetingbaas_mcp::models::{Granularity, TranscriptSegment};
use meetingbaas_mcp::services::{MomentOptions, MomentSelector, TopicExtractor};

// ============================================================================
// Test Data
// ============================================================================

const SPEAKERS: [&str; 4] = ["Alice", "Bob", "Carol", "Dan"];

const LINES: [&str; 8] = [
    "let us start with the quarterly budget review",
    "the budget for infrastructure grew by twenty percent",
    "we decided to migrate the billing service next quarter",
    "action item for Bob is the migration plan",
    "customers keep asking about enterprise pricing",
    "pricing for the enterprise tier needs a discount option",
    "hiring two engineers is blocked on the budget",
    "to summarize we agreed on the migration and the pricing change",
];

fn transcript(len: usize) -> Vec<TranscriptSegment> {
    (0..len)
        .map(|i| {
            TranscriptSegment::new(
                SPEAKERS[i % SPEAKERS.len()],
                i as f64 * 12.0,
                LINES[i % LINES.len()],
            )
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_topic_extraction(c: &mut Criterion) {
    let extractor = TopicExtractor::new();
    let mut group = c.benchmark_group("topic_extraction");

    for len in [50usize, 500, 2000] {
        let segments = transcript(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &segments, |b, s| {
            b.iter(|| extractor.extract_labels(black_box(s), 5));
        });
    }

    group.finish();
}

fn bench_moment_selection(c: &mut Criterion) {
    let topics = vec!["budget".to_string(), "pricing".to_string(), "migration".to_string()];
    let mut group = c.benchmark_group("moment_selection");

    for granularity in [Granularity::Low, Granularity::Medium, Granularity::High] {
        let selector = MomentSelector::new(MomentOptions::for_granularity(granularity, 10));
        let segments = transcript(1000);
        group.bench_with_input(
            BenchmarkId::new("select", format!("{granularity:?}").to_lowercase()),
            &segments,
            |b, s| {
                b.iter(|| selector.select(black_box(s), &topics));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_topic_extraction, bench_moment_selection);
criterion_main!(benches);
