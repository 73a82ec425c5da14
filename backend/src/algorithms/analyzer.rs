//! Per-user analysis across every indicator.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::extractor::extract;
use super::search::{search, SearchParams};
use crate::config::RhythmConfig;
use crate::models::{
    fingerprint_samples, sort_by_date, Clock, DailySample, Indicator, PeriodEstimate,
    RhythmResult, SystemClock,
};

/// Runs extraction and the period sweep for every analyzable indicator.
///
/// Stateless apart from its configuration; `analyze` has no side effects and
/// can run on any thread.
#[derive(Clone)]
pub struct RhythmAnalyzer {
    params: SearchParams,
    min_data_points: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RhythmAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhythmAnalyzer")
            .field("params", &self.params)
            .field("min_data_points", &self.min_data_points)
            .finish()
    }
}

impl Default for RhythmAnalyzer {
    fn default() -> Self {
        Self::new(&RhythmConfig::default(), Arc::new(SystemClock))
    }
}

impl RhythmAnalyzer {
    pub fn new(config: &RhythmConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            params: SearchParams::from(config),
            min_data_points: config.min_data_points,
            clock,
        }
    }

    /// Analyze a full history.
    ///
    /// Histories shorter than `min_data_points` yield a result without
    /// estimates. Samples may arrive in any order; they are sorted by date
    /// once (stably, so duplicate dates keep their encounter order).
    pub fn analyze(&self, samples: &[DailySample]) -> RhythmResult {
        let analysis_date = self.clock.now();
        let fingerprint = fingerprint_samples(samples);

        if samples.len() < self.min_data_points {
            log::debug!(
                "Skipping rhythm analysis: {} samples, need {}",
                samples.len(),
                self.min_data_points
            );
            return RhythmResult::empty(samples.len(), analysis_date, fingerprint);
        }

        let mut ordered = samples.to_vec();
        sort_by_date(&mut ordered);

        let mut estimates = BTreeMap::new();
        for indicator in Indicator::analyzable() {
            let series = extract(indicator, &ordered);
            if series.is_empty() {
                continue;
            }
            match search(&series, &self.params) {
                Some(fit) => {
                    log::debug!(
                        "{}: period {:.1} days (confidence {:.3}, {} samples)",
                        indicator,
                        fit.period,
                        fit.confidence,
                        series.len()
                    );
                    estimates.insert(
                        indicator,
                        PeriodEstimate {
                            indicator,
                            period_days: qtty::Days::new(fit.period),
                            confidence: fit.confidence,
                            breakdown: fit.breakdown,
                            sample_count_used: series.len(),
                            computed_at: analysis_date,
                        },
                    );
                }
                None => log::debug!("{}: no period above the confidence floor", indicator),
            }
        }

        RhythmResult {
            estimates,
            total_data_points: samples.len(),
            analysis_date,
            source_fingerprint: fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FixedClock;
    use chrono::{Duration, NaiveDate};
    use std::f64::consts::PI;

    fn analyzer(config: &RhythmConfig) -> RhythmAnalyzer {
        RhythmAnalyzer::new(config, Arc::new(FixedClock::from_unix_timestamp(1_714_550_400)))
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn sine_history(indicator: Indicator, days: i64, period: f64) -> Vec<DailySample> {
        (0..days)
            .map(|d| {
                let value = 60.0 + 30.0 * (2.0 * PI * d as f64 / period).sin();
                DailySample::new(start() + Duration::days(d))
                    .with_value(indicator, value.round() as i32)
            })
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let result = analyzer(&RhythmConfig::default()).analyze(&[]);
        assert!(result.is_empty());
        assert_eq!(result.total_data_points, 0);
    }

    #[test]
    fn test_below_min_data_points_is_empty_not_error() {
        let config = RhythmConfig {
            min_data_points: 100,
            ..RhythmConfig::default()
        };
        let samples = sine_history(Indicator::Physical, 60, 20.0);
        let result = analyzer(&config).analyze(&samples);
        assert!(result.is_empty());
        assert_eq!(result.total_data_points, 60);
    }

    #[test]
    fn test_detects_clean_cycle() {
        let samples = sine_history(Indicator::Sleep, 40, 12.0);
        let result = analyzer(&RhythmConfig::default()).analyze(&samples);

        let estimate = result.estimate(Indicator::Sleep).unwrap();
        assert!((estimate.period_days.value() - 12.0).abs() <= 0.5);
        assert!(estimate.confidence >= 0.25 && estimate.confidence <= 1.0);
        assert_eq!(estimate.sample_count_used, 40);
        assert_eq!(estimate.computed_at, result.analysis_date);
        assert!(result.estimate(Indicator::Mental).is_none());
    }

    #[test]
    fn test_aggregate_indicator_is_never_analyzed() {
        let samples = sine_history(Indicator::Overall, 50, 20.0);
        let result = analyzer(&RhythmConfig::default()).analyze(&samples);
        assert!(result.is_empty());
        assert_eq!(result.total_data_points, 50);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let samples = sine_history(Indicator::Emotional, 50, 20.0);
        let mut reversed = samples.clone();
        reversed.reverse();

        let a = analyzer(&RhythmConfig::default());
        assert_eq!(a.analyze(&samples), a.analyze(&reversed));
    }

    #[test]
    fn test_constant_indicator_is_absent() {
        let samples: Vec<_> = (0..60)
            .map(|d| {
                DailySample::new(start() + Duration::days(d))
                    .with_value(Indicator::Appetite, 3)
                    .with_value(
                        Indicator::Physical,
                        (50.0 + 20.0 * (2.0 * PI * d as f64 / 20.0).sin()).round() as i32,
                    )
            })
            .collect();
        let result = analyzer(&RhythmConfig::default()).analyze(&samples);
        assert!(result.estimate(Indicator::Appetite).is_none());
        assert!(result.estimate(Indicator::Physical).is_some());
    }

    #[test]
    fn test_duplicate_dates_do_not_panic() {
        let mut samples = sine_history(Indicator::Mental, 40, 14.0);
        samples.extend(sine_history(Indicator::Mental, 10, 14.0));
        let result = analyzer(&RhythmConfig::default()).analyze(&samples);
        assert_eq!(result.total_data_points, 50);
    }
}
