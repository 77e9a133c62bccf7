//! Readers racing writers on one repository.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use fxrate_engine::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const WRITES: i64 = 200;

fn start() -> Date {
    Date::from_ymd(2024, 1, 1).unwrap()
}

/// Every observation of generation `k` carries the factor `100 + k`.
fn generation(k: i64) -> RateSeries {
    RateSeries::from_observations(
        CurrencyPair::new("USD", "JPY"),
        (0..=k).map(|offset| ExchangeRate::new(start().add_days(offset), Decimal::from(100 + k))),
    )
    .unwrap()
}

fn assert_uniform(series: &RateSeries) {
    let Some(first) = series.first() else {
        return;
    };
    assert!(
        series.observations().iter().all(|rate| rate.value() == first.value()),
        "torn series {}",
        series.pair()
    );
}

#[test]
fn readers_never_observe_partial_series() {
    let repo = Arc::new(SeriesRepository::default());
    repo.add_observation("EUR", "USD", ExchangeRate::new(start(), dec!(1.10))).unwrap();
    repo.register_series(generation(0));

    let done = AtomicBool::new(false);
    let (usd, jpy, eur) = (
        CurrencyCode::new("USD"),
        CurrencyCode::new("JPY"),
        CurrencyCode::new("EUR"),
    );

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let raw = repo.get_series(&usd, &jpy);
                    assert_uniform(&raw);
                    let factor = raw.first().unwrap().value() - dec!(100);
                    assert_eq!(Decimal::from(raw.len() as i64 - 1), factor);

                    let derived = repo.get_series(&eur, &jpy);
                    assert!(derived.is_derived());
                    assert_uniform(&derived);
                }
            });
        }

        scope.spawn(|| {
            for k in 1..=WRITES {
                repo.register_series(generation(k));

                // A write is visible to the next read, composed rates included
                let composed = repo.get_series(&eur, &jpy).lookup_rate(start()).unwrap();
                assert_eq!(composed.value(), dec!(1.10) * Decimal::from(100 + k));
            }
            done.store(true, Ordering::Release);
        });
    });

    let final_series = repo.raw_series(&CurrencyPair::new("USD", "JPY")).unwrap();
    assert_eq!(final_series.len(), WRITES as usize + 1);
}

#[test]
fn converters_on_many_threads_agree() {
    let d = start();
    let repo = Arc::new(SeriesRepository::default());
    repo.apply_observations([
        RateObservation::new("EUR", "USD", d, dec!(1.10)),
        RateObservation::new("USD", "JPY", d, dec!(150.0)),
        RateObservation::new("GBP", "USD", d, dec!(1.27)),
    ])
    .unwrap();

    let jpy = CurrencyConverter::new(repo, "JPY");
    let results: Vec<Decimal> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let converter = jpy.clone();
                scope.spawn(move || {
                    converter
                        .get_rate(d, &CurrencyCode::new("EUR"))
                        .unwrap()
                        .value()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|value| *value == dec!(165.0)));
}
