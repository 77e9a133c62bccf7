//! Benchmarks for series lookup and cross-rate conversion.
//!
//! Run with: cargo bench -p fxrate-engine

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fxrate_core::{CurrencyCode, CurrencyPair, Date, ExchangeRate};
use fxrate_engine::{CurrencyConverter, RateSeries, SeriesRepository};

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn start() -> Date {
    Date::from_ymd(2015, 1, 1).unwrap()
}

fn daily_series(source: &str, term: &str, days: i64, base: Decimal) -> RateSeries {
    RateSeries::from_observations(
        CurrencyPair::new(source, term),
        (0..days).map(|offset| {
            let drift = Decimal::new(offset % 97, 4);
            ExchangeRate::new(start().add_days(offset), base + drift)
        }),
    )
    .unwrap()
}

fn majors(days: i64) -> Arc<SeriesRepository> {
    let repo = SeriesRepository::default();
    repo.register_series(daily_series("EUR", "USD", days, dec!(1.08)));
    repo.register_series(daily_series("GBP", "USD", days, dec!(1.25)));
    repo.register_series(daily_series("USD", "JPY", days, dec!(140)));
    repo.register_series(daily_series("USD", "CHF", days, dec!(0.88)));
    Arc::new(repo)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_lookup");
    for days in [250i64, 2_500, 10_000] {
        let series = daily_series("EUR", "USD", days, dec!(1.08));
        let query = start().add_days(days / 2);
        group.bench_with_input(BenchmarkId::from_parameter(days), &series, |b, series| {
            b.iter(|| black_box(series.lookup_rate(black_box(query))));
        });
    }
    group.finish();
}

fn bench_conversion(c: &mut Criterion) {
    let repo = majors(2_500);
    let jpy = CurrencyConverter::new(repo.clone(), "JPY");
    let usd = jpy.with("USD");
    let date = start().add_days(1_000);
    let (eur, gbp) = (CurrencyCode::new("EUR"), CurrencyCode::new("GBP"));

    c.bench_function("convert_direct", |b| {
        b.iter(|| usd.convert(black_box(date), dec!(100), &eur).unwrap());
    });

    c.bench_function("convert_derived_cached", |b| {
        b.iter(|| jpy.convert(black_box(date), dec!(100), &gbp).unwrap());
    });

    c.bench_function("compose_derived", |b| {
        b.iter(|| {
            repo.clear_derived();
            black_box(repo.get_series(&eur, &CurrencyCode::new("CHF")))
        });
    });
}

criterion_group!(lookup, bench_lookup);
criterion_group!(conversion, bench_conversion);
criterion_main!(lookup, conversion);
