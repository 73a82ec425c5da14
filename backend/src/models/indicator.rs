use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independently tracked wellness dimension.
///
/// The set is closed. `Overall` is a synthetic aggregate some sample sources
/// report alongside the real dimensions; it is stored but never analyzed for a
/// period on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Physical,
    Mental,
    Emotional,
    Sleep,
    Appetite,
    Overall,
}

impl Indicator {
    /// Every indicator, aggregate included.
    pub const ALL: [Indicator; 6] = [
        Indicator::Physical,
        Indicator::Mental,
        Indicator::Emotional,
        Indicator::Sleep,
        Indicator::Appetite,
        Indicator::Overall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Physical => "physical",
            Indicator::Mental => "mental",
            Indicator::Emotional => "emotional",
            Indicator::Sleep => "sleep",
            Indicator::Appetite => "appetite",
            Indicator::Overall => "overall",
        }
    }

    /// Whether this is the synthetic aggregate rather than a measured dimension.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Indicator::Overall)
    }

    /// Indicators that take part in period detection, in declaration order.
    pub fn analyzable() -> impl Iterator<Item = Indicator> {
        Self::ALL.into_iter().filter(|i| !i.is_aggregate())
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physical" => Ok(Self::Physical),
            "mental" => Ok(Self::Mental),
            "emotional" => Ok(Self::Emotional),
            "sleep" => Ok(Self::Sleep),
            "appetite" => Ok(Self::Appetite),
            "overall" => Ok(Self::Overall),
            _ => Err(format!("Unknown indicator: {}", s)),
        }
    }
}
