//! Benchmarks for dashboard state maintenance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cardex_market_data::{Dashboard, OrderedView, Record, SortDirection, SortKey};
use rust_decimal::Decimal;

fn record(id: u64) -> Record {
    Record {
        id,
        name: format!("card-{id}"),
        listing_price: Decimal::from(1 + (id * 37) % 3000),
        current_price: Decimal::from(400 + (id * 91) % 3600),
    }
}

fn benchmark_sorted_insert(c: &mut Criterion) {
    c.bench_function("insert_1000_under_active_sort", |b| {
        b.iter(|| {
            let mut view = OrderedView::new();
            view.reorder(SortKey::CurrentPrice, SortDirection::Descending);
            for id in 0..1000 {
                view.insert(black_box(record(id)));
            }
        })
    });
}

fn benchmark_naive_resort_per_insert(c: &mut Criterion) {
    // Baseline: what re-sorting the whole collection on every event costs.
    c.bench_function("insert_1000_resort_each_time", |b| {
        b.iter(|| {
            let mut view = OrderedView::new();
            for id in 0..1000 {
                view.insert(black_box(record(id)));
                view.reorder(SortKey::CurrentPrice, SortDirection::Descending);
            }
        })
    });
}

fn benchmark_reorder(c: &mut Criterion) {
    let mut view = OrderedView::new();
    for id in 0..1000 {
        view.insert(record(id));
    }

    c.bench_function("reorder_1000", |b| {
        b.iter(|| {
            view.reorder(black_box(SortKey::Name), SortDirection::Ascending);
            view.reorder(black_box(SortKey::Id), SortDirection::Ascending);
        })
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut dashboard = Dashboard::new(5).unwrap();
    for id in 0..1000 {
        dashboard.ingest(record(id));
    }

    c.bench_function("snapshot_1000", |b| {
        b.iter(|| {
            black_box(dashboard.snapshot());
        })
    });
}

criterion_group!(
    benches,
    benchmark_sorted_insert,
    benchmark_naive_resort_per_insert,
    benchmark_reorder,
    benchmark_snapshot
);
criterion_main!(benches);
