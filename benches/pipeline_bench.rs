use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orders_eda::stats::normality::shapiro_wilk;
use orders_eda::{derive_features, run, AnalysisConfig, OrderRecord, OrderTable};

fn synthetic_orders(n: usize) -> OrderTable {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();

    let records = (0..n)
        .map(|i| {
            let order_date = start + Duration::hours((i * 7) as i64);
            let price = 20.0 + ((i * 37) % 180) as f64;
            OrderRecord {
                order_id: Some(format!("O{}", i)),
                order_date: Some(order_date),
                delivery_forecast: Some(order_date + Duration::days(5)),
                delivery_date: Some(order_date + Duration::days(2 + (i % 6) as i64)),
                subtotal: Some(price + 4.0),
                discount: Some(4.0),
                total: Some(price),
                freight_price: Some(price * 0.08),
                product_price: Some(price),
                is_confirmed: Some(if i % 9 == 0 { 0.0 } else { 1.0 }),
                category: Some(format!("cat{}", i % 8)),
                subcategory: Some(format!("sub{}", i % 23)),
                delivery_service: Some(format!("svc{}", i % 3)),
                ..Default::default()
            }
        })
        .collect();

    OrderTable::from_records(records)
}

fn bench_derive_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_features");
    for size in [1_000, 10_000] {
        let table = synthetic_orders(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| derive_features(black_box(table)))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let table = synthetic_orders(20_000);

    c.bench_function("run_pipeline_20k", |b| {
        b.iter(|| run(black_box(&table), &config).unwrap())
    });
}

fn bench_shapiro_wilk(c: &mut Criterion) {
    let data: Vec<f64> = (0..5000).map(|i| ((i * 7919) % 5000) as f64).collect();

    c.bench_function("shapiro_wilk_5000", |b| {
        b.iter(|| shapiro_wilk(black_box(&data)).unwrap())
    });
}

criterion_group!(benches, bench_derive_features, bench_pipeline, bench_shapiro_wilk);
criterion_main!(benches);
