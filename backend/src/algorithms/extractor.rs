use crate::models::{DailySample, Indicator};

/// Pull one indicator's values out of a date-ordered history.
///
/// Samples without a value for `indicator` are skipped, so the result can be
/// shorter than the history. No gap filling: the series holds the available
/// values in chronological order and nothing else. An empty result is a normal
/// outcome, not an error.
///
/// The caller is responsible for ordering `samples` by date.
pub fn extract(indicator: Indicator, samples: &[DailySample]) -> Vec<f64> {
    samples
        .iter()
        .filter_map(|sample| sample.value(indicator))
        .map(f64::from)
        .collect()
}
