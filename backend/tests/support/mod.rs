#![allow(dead_code)]

use std::collections::HashSet;
use std::f64::consts::PI;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rhythm_engine::models::{DailySample, Indicator};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Deterministic integer noise in `[-10, 10]` from a multiplicative hash of
/// the day index. `salt` selects an independent sequence.
pub fn jitter(day: usize, salt: usize) -> f64 {
    let h = ((day + salt) as u32).wrapping_mul(2_654_435_761);
    ((h >> 16) % 21) as f64 - 10.0
}

/// `baseline + amplitude * sin(2π day / period) + noise_scale * jitter`,
/// rounded to the nearest integer the way a slider would record it.
pub fn planted_series(
    days: usize,
    period: f64,
    baseline: f64,
    amplitude: f64,
    noise_scale: f64,
    salt: usize,
) -> Vec<i32> {
    (0..days)
        .map(|d| {
            let value = baseline
                + amplitude * (2.0 * PI * d as f64 / period).sin()
                + noise_scale * jitter(d, salt);
            (value + 0.5).floor() as i32
        })
        .collect()
}

/// Like [`planted_series`], with integer noise drawn uniformly from
/// `[-noise, noise]` by a ChaCha generator seeded with `seed`.
pub fn seeded_planted_series(
    days: usize,
    period: f64,
    baseline: f64,
    amplitude: f64,
    noise: i32,
    seed: u64,
) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..days)
        .map(|d| {
            let value = baseline
                + amplitude * (2.0 * PI * d as f64 / period).sin()
                + f64::from(rng.gen_range(-noise..=noise));
            (value + 0.5).floor() as i32
        })
        .collect()
}

/// Uniform integer noise in `[low, high]` from a seeded ChaCha generator.
pub fn noise_series(days: usize, low: i32, high: i32, seed: u64) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..days).map(|_| rng.gen_range(low..=high)).collect()
}

/// One sample per consecutive day starting at [`start_date`].
pub fn daily_samples(indicator: Indicator, values: &[i32]) -> Vec<DailySample> {
    values
        .iter()
        .enumerate()
        .map(|(d, &v)| {
            DailySample::new(start_date() + Duration::days(d as i64)).with_value(indicator, v)
        })
        .collect()
}
