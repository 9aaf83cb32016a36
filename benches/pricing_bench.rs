//! Benchmark for quote pricing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prado_store::configurator::Configurator;
use prado_store::pricing::{compute_order_summary, compute_piece_total, format_currency};
use prado_store::types::{PieceDimensions, ProductConfig};

fn bench_piece_total(c: &mut Criterion) {
    c.bench_function("compute_piece_total", |b| {
        b.iter(|| compute_piece_total(black_box(1234), black_box(7), black_box(99.0), black_box(12.5)));
    });
}

fn bench_order_summary(c: &mut Criterion) {
    let pieces: Vec<PieceDimensions> = (1..=100)
        .map(|i| PieceDimensions::new(i * 29, (i % 5) + 1))
        .collect();

    c.bench_function("compute_order_summary_100", |b| {
        b.iter(|| compute_order_summary(black_box(&pieces), black_box(99.0)));
    });
}

fn bench_format_currency(c: &mut Criterion) {
    c.bench_function("format_currency", |b| {
        b.iter(|| format_currency(black_box(1_234_567.895)));
    });
}

fn bench_reprice_configurator(c: &mut Criterion) {
    let mut configurator = Configurator::new(ProductConfig::default());
    for _ in 0..49 {
        configurator.add_piece();
    }

    c.bench_function("apply_config_50_pieces", |b| {
        b.iter(|| {
            let config = ProductConfig {
                price_per_meter: black_box(105.0),
                ..ProductConfig::default()
            };
            configurator.apply_config(config);
        });
    });
}

criterion_group!(
    benches,
    bench_piece_total,
    bench_order_summary,
    bench_format_currency,
    bench_reprice_configurator
);
criterion_main!(benches);
