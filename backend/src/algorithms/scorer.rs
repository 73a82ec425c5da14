//! Plausibility score for a candidate period.
//!
//! The composite score blends three independent views of "does this series
//! repeat every L samples":
//!
//! | sub-score            | weight | question                                        |
//! |----------------------|--------|-------------------------------------------------|
//! | autocorrelation      | 0.5    | does the series resemble itself shifted by L?   |
//! | consistency          | 0.3    | do consecutive L-long cycles look alike?        |
//! | amplitude stability  | 0.2    | is the peak-to-trough swing steady per cycle?   |
//!
//! L is the candidate period rounded to the nearest whole sample. Every
//! function here is pure, and degenerate input (empty windows, zero variance,
//! zero amplitude) scores 0 instead of producing NaN.

use crate::models::ScoreBreakdown;

pub const AUTOCORRELATION_WEIGHT: f64 = 0.5;
pub const CONSISTENCY_WEIGHT: f64 = 0.3;
pub const AMPLITUDE_STABILITY_WEIGHT: f64 = 0.2;

/// Integer lag for a candidate period, or `None` when the rounded period is
/// not positive or does not fit inside the observed history.
pub fn lag_for(series_len: usize, candidate_period: f64) -> Option<usize> {
    let lag = candidate_period.round();
    if !lag.is_finite() || lag <= 0.0 || lag >= series_len as f64 {
        return None;
    }
    Some(lag as usize)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation coefficient of two equally long slices.
///
/// Returns 0 for mismatched or empty input and when either side has zero
/// variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        (numerator / denominator).clamp(-1.0, 1.0)
    }
}

/// Absolute correlation between the series and itself shifted by `lag`.
///
/// An inverted cycle is still a cycle, hence the absolute value.
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if lag == 0 || lag >= series.len() {
        return 0.0;
    }
    let n = series.len();
    pearson(&series[..n - lag], &series[lag..]).abs()
}

/// Mean absolute correlation over every pair of consecutive, non-overlapping
/// `lag`-long chunks. A trailing partial chunk is ignored.
pub fn consistency(series: &[f64], lag: usize) -> f64 {
    if lag == 0 {
        return 0.0;
    }
    let chunks: Vec<&[f64]> = series.chunks_exact(lag).collect();
    if chunks.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..chunks.len() {
        for j in (i + 1)..chunks.len() {
            total += pearson(chunks[i], chunks[j]).abs();
            pairs += 1;
        }
    }
    total / pairs as f64
}

/// `1 - coefficient of variation` of the per-chunk peak-to-trough amplitude,
/// floored at 0. Uses the population standard deviation.
pub fn amplitude_stability(series: &[f64], lag: usize) -> f64 {
    if lag == 0 {
        return 0.0;
    }
    let amplitudes: Vec<f64> = series
        .chunks_exact(lag)
        .map(|chunk| {
            let max = chunk.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = chunk.iter().copied().fold(f64::INFINITY, f64::min);
            max - min
        })
        .collect();
    if amplitudes.len() < 2 {
        return 0.0;
    }

    let mean_amplitude = mean(&amplitudes);
    if mean_amplitude <= 0.0 {
        return 0.0;
    }
    let variance = amplitudes
        .iter()
        .map(|a| (a - mean_amplitude).powi(2))
        .sum::<f64>()
        / amplitudes.len() as f64;
    let coefficient_of_variation = variance.sqrt() / mean_amplitude;

    (1.0 - coefficient_of_variation).clamp(0.0, 1.0)
}

/// All three sub-scores for `candidate_period`; zeros when the candidate is
/// rejected by [`lag_for`].
pub fn score_breakdown(series: &[f64], candidate_period: f64) -> ScoreBreakdown {
    match lag_for(series.len(), candidate_period) {
        Some(lag) => ScoreBreakdown {
            autocorrelation: autocorrelation(series, lag),
            consistency: consistency(series, lag),
            amplitude_stability: amplitude_stability(series, lag),
        },
        None => ScoreBreakdown::default(),
    }
}

/// Weighted blend of a breakdown, in [0, 1].
pub fn composite(breakdown: &ScoreBreakdown) -> f64 {
    let score = AUTOCORRELATION_WEIGHT * breakdown.autocorrelation
        + CONSISTENCY_WEIGHT * breakdown.consistency
        + AMPLITUDE_STABILITY_WEIGHT * breakdown.amplitude_stability;
    score.clamp(0.0, 1.0)
}

/// Composite plausibility of `candidate_period` for `series`, in [0, 1].
pub fn score(series: &[f64], candidate_period: f64) -> f64 {
    composite(&score_breakdown(series, candidate_period))
}
