//! End-to-end analyzer behaviour on synthetic histories.

mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use rhythm_engine::algorithms::RhythmAnalyzer;
use rhythm_engine::config::RhythmConfig;
use rhythm_engine::models::{DailySample, FixedClock, Indicator};
use support::{
    daily_samples, noise_series, planted_series, seeded_planted_series, start_date,
};

fn analyzer(config: &RhythmConfig) -> RhythmAnalyzer {
    RhythmAnalyzer::new(config, Arc::new(FixedClock::from_unix_timestamp(1_719_792_000)))
}

/// Harmonic aliasing makes a minority of noisy histories miss; the rate is
/// what holds.
#[test]
fn test_sixty_day_physical_scenario() {
    let analyzer = analyzer(&RhythmConfig::default());
    let seeds = 200;
    let mut misses = Vec::new();

    for seed in 0..seeds {
        let values = seeded_planted_series(60, 25.0, 65.0, 25.0, 10, seed);
        let result = analyzer.analyze(&daily_samples(Indicator::Physical, &values));
        assert_eq!(result.total_data_points, 60);

        match result.estimate(Indicator::Physical) {
            Some(estimate) => {
                assert!(estimate.confidence >= 0.25 && estimate.confidence <= 1.0);
                assert_eq!(estimate.sample_count_used, 60);
                let period = estimate.period_days.value();
                if (period - 25.0).abs() > 1.0 || estimate.confidence <= 0.25 {
                    misses.push((seed, period));
                }
            }
            None => misses.push((seed, f64::NAN)),
        }
    }

    assert!(
        misses.len() * 10 <= seeds as usize * 3,
        "{} of {} seeds missed: {:?}",
        misses.len(),
        seeds,
        misses
    );
}

#[test]
fn test_planted_periods_are_recovered_within_one_step() {
    let config = RhythmConfig::default();
    let analyzer = analyzer(&config);

    // Two full cycles of each period.
    for period in [10.0, 15.0, 18.0, 25.0, 30.0, 33.0] {
        for salt in 0..4 {
            let days = (2.0 * period) as usize;
            let values = planted_series(days, period, 60.0, 20.0, 0.5, salt);
            let result = analyzer.analyze(&daily_samples(Indicator::Mental, &values));

            let estimate = result.estimate(Indicator::Mental).unwrap();
            assert!(
                (estimate.period_days.value() - period).abs() <= config.step,
                "period {} salt {}: detected {}",
                period,
                salt,
                estimate.period_days.value()
            );
            assert!(estimate.confidence >= config.confidence_floor);
        }
    }
}

#[test]
fn test_default_floor_reports_periods_in_noise() {
    let analyzer = analyzer(&RhythmConfig::default());

    for (days, low, high) in [(90, 0, 100), (60, 1, 5)] {
        let mut detections = 0;
        for seed in 0..100 {
            let values = noise_series(days, low, high, seed);
            let samples = daily_samples(Indicator::Emotional, &values);
            if let Some(e) = analyzer.analyze(&samples).estimate(Indicator::Emotional) {
                assert!(e.confidence >= 0.25 && e.confidence <= 1.0);
                detections += 1;
            }
        }
        assert!(
            detections >= 90,
            "only {} of 100 noise histories ({} days in {}..={}) cleared the default floor",
            detections,
            days,
            low,
            high
        );
    }
}

#[test]
fn test_strict_floor_rejects_noise() {
    let strict = analyzer(&RhythmConfig {
        confidence_floor: 0.7,
        ..RhythmConfig::default()
    });

    let mut detections = 0;
    for seed in 0..100 {
        let samples = daily_samples(Indicator::Emotional, &noise_series(90, 0, 100, seed));
        if let Some(e) = strict.analyze(&samples).estimate(Indicator::Emotional) {
            assert!(e.confidence >= 0.7 && e.confidence <= 1.0);
            detections += 1;
        }
    }
    assert!(
        detections <= 5,
        "{} of 100 noise histories passed a 0.7 floor",
        detections
    );
}

#[test]
fn test_constant_indicator_is_never_reported() {
    let analyzer = analyzer(&RhythmConfig {
        confidence_floor: 0.0,
        ..RhythmConfig::default()
    });
    let samples = daily_samples(Indicator::Appetite, &[4; 90]);
    assert!(analyzer.analyze(&samples).is_empty());
}

#[test]
fn test_empty_history_is_a_normal_result() {
    let result = analyzer(&RhythmConfig::default()).analyze(&[]);
    assert!(result.estimates.is_empty());
    assert_eq!(result.total_data_points, 0);
}

#[test]
fn test_indicators_are_analyzed_independently() {
    let physical = planted_series(60, 25.0, 65.0, 25.0, 1.0, 0);
    let sleep = planted_series(60, 30.0, 60.0, 20.0, 0.5, 1);
    let samples: Vec<DailySample> = (0..60)
        .map(|d| {
            DailySample::new(start_date() + Duration::days(d as i64))
                .with_value(Indicator::Physical, physical[d])
                .with_value(Indicator::Sleep, sleep[d])
                .with_value(Indicator::Mental, 3)
                .with_value(Indicator::Overall, (physical[d] + sleep[d]) / 2)
        })
        .collect();

    let result = analyzer(&RhythmConfig::default()).analyze(&samples);
    let periods: BTreeMap<Indicator, f64> = result
        .estimates
        .iter()
        .map(|(indicator, e)| (*indicator, e.period_days.value()))
        .collect();

    assert_eq!(
        periods.keys().copied().collect::<Vec<_>>(),
        vec![Indicator::Physical, Indicator::Sleep]
    );
    assert!((periods[&Indicator::Physical] - 25.0).abs() <= 1.0);
    assert!((periods[&Indicator::Sleep] - 30.0).abs() <= 0.5);
}

#[test]
fn test_missing_values_shorten_the_series() {
    let values = planted_series(60, 25.0, 65.0, 25.0, 1.0, 0);
    let mut samples = daily_samples(Indicator::Physical, &values);
    // Every fourth day only records sleep.
    for sample in samples.iter_mut().step_by(4) {
        sample.values.clear();
        sample.values.insert(Indicator::Sleep, 3);
    }

    let result = analyzer(&RhythmConfig::default()).analyze(&samples);
    assert_eq!(result.total_data_points, 60);
    if let Some(e) = result.estimate(Indicator::Physical) {
        assert_eq!(e.sample_count_used, 45);
    }
    assert!(result.estimate(Indicator::Sleep).is_none());
}

#[test]
fn test_repeated_analysis_is_bit_identical() {
    let values = planted_series(60, 25.0, 65.0, 25.0, 1.0, 3);
    let samples = daily_samples(Indicator::Physical, &values);
    let analyzer = analyzer(&RhythmConfig::default());

    let first = analyzer.analyze(&samples);
    let second = analyzer.analyze(&samples);
    assert_eq!(first, second);

    let a = first.estimate(Indicator::Physical).unwrap();
    let b = second.estimate(Indicator::Physical).unwrap();
    assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    assert_eq!(first.source_fingerprint, second.source_fingerprint);
}

#[test]
fn test_min_data_points_gates_analysis() {
    let values = planted_series(60, 25.0, 65.0, 25.0, 1.0, 0);
    let samples = daily_samples(Indicator::Physical, &values);

    let gated = analyzer(&RhythmConfig {
        min_data_points: 61,
        ..RhythmConfig::default()
    });
    let result = gated.analyze(&samples);
    assert!(result.is_empty());
    assert_eq!(result.total_data_points, 60);

    let open = analyzer(&RhythmConfig {
        min_data_points: 60,
        ..RhythmConfig::default()
    });
    assert!(!open.analyze(&samples).is_empty());
}
