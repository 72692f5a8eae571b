//! Criterion benchmarks for log_shipper

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use log_shipper::prelude::*;
use log_shipper::FlushController;
use std::sync::Arc;
use std::time::Duration;

/// Accepts every batch and keeps nothing
struct NullTransport;

impl Transport for NullTransport {
    fn deliver(&mut self, batch: &LogBatch) -> Result<()> {
        black_box(batch.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn bench_logger() -> Logger {
    Logger::builder()
        .max_buffer_size(1000)
        .max_buffered_entries(100_000)
        .flush_interval(Duration::from_millis(100))
        .transport(NullTransport)
        .build()
        .expect("Failed to build logger")
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_facade_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_logging");
    group.throughput(Throughput::Elements(1));

    let logger = bench_logger();

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Lead assigned to owner"));
        });
    });

    group.bench_function("info_with_context", |b| {
        b.iter(|| {
            logger.info_with_context(
                black_box("Request handled"),
                LogContext::new()
                    .with_http("GET", "/api/leads", 200)
                    .with_request_id("req-8f2c")
                    .with_field("duration_ms", 42),
            );
        });
    });

    group.bench_function("scoped_field", |b| {
        let _guard = logger.scoped_field("tenant", "acme");
        b.iter(|| {
            logger.warn(black_box("Quota nearly used"));
        });
    });

    group.finish();
    logger.shutdown();
}

// ============================================================================
// Serialization Benchmarks
// ============================================================================

fn bench_batch_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_serialization");

    for size in [10usize, 100, 1000] {
        let batch = LogBatch::new(
            (0..size)
                .map(|i| {
                    LogEntry::new(LogLevel::Info, format!("entry {}", i))
                        .with_context(LogContext::new().with_field("seq", i as i64))
                })
                .collect(),
        );

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| serde_json::to_vec(black_box(batch)).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Flush Controller Benchmarks
// ============================================================================

fn bench_controller_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush_controller");
    group.throughput(Throughput::Elements(1));

    for threshold in [10usize, 100, 1000] {
        let config = LoggerConfig {
            max_buffer_size: threshold,
            ..LoggerConfig::default()
        };
        let mut controller =
            FlushController::new(NullTransport, &config, Arc::new(LoggerMetrics::new()));

        group.bench_function(BenchmarkId::new("push", threshold), |b| {
            b.iter(|| {
                controller.push(LogEntry::new(LogLevel::Debug, black_box("tick")));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_facade_logging,
    bench_batch_serialization,
    bench_controller_push
);
criterion_main!(benches);
