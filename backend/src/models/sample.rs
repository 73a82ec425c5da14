use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::indicator::Indicator;

/// One day's self-reported wellness record.
///
/// Values are kept as integers on whatever scale the source uses (0-100
/// sliders, 1-5 ordinal answers); the engine only relies on their ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySample {
    pub date: NaiveDate,
    #[serde(default)]
    pub values: BTreeMap<Indicator, i32>,
}

impl DailySample {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly used when assembling fixtures.
    pub fn with_value(mut self, indicator: Indicator, value: i32) -> Self {
        self.values.insert(indicator, value);
        self
    }

    pub fn value(&self, indicator: Indicator) -> Option<i32> {
        self.values.get(&indicator).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay another record for the same day; its values replace ours
    /// indicator by indicator.
    pub fn merge(&mut self, other: DailySample) {
        debug_assert_eq!(self.date, other.date);
        self.values.extend(other.values);
    }
}

/// Stable ascending sort by date. Entries sharing a date keep encounter order.
pub fn sort_by_date(samples: &mut [DailySample]) {
    samples.sort_by_key(|s| s.date);
}
