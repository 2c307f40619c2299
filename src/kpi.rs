// =============================================================================
// KPI Catalogue — the fixed set of tracked business KPIs
// =============================================================================
//
// The four KPIs are a closed, compile-time set.  Targets and sampling
// distributions are tunable through the runtime config; the direction and
// rounding precision of each KPI are not.
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Direction;

/// One of the four tracked KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    Uptime,
    Tat,
    ErrorRate,
    CustomerSatisfaction,
}

impl Kpi {
    /// All tracked KPIs in table column order.
    pub const ALL: [Kpi; 4] = [
        Kpi::Uptime,
        Kpi::Tat,
        Kpi::ErrorRate,
        Kpi::CustomerSatisfaction,
    ];

    /// Display name, including the unit.
    pub fn name(self) -> &'static str {
        match self {
            Self::Uptime => "Uptime %",
            Self::Tat => "TAT (hrs)",
            Self::ErrorRate => "Error Rate %",
            Self::CustomerSatisfaction => "Customer Satisfaction %",
        }
    }

    /// Stable machine key (matches the serde representation).
    pub fn key(self) -> &'static str {
        match self {
            Self::Uptime => "uptime",
            Self::Tat => "tat",
            Self::ErrorRate => "error_rate",
            Self::CustomerSatisfaction => "customer_satisfaction",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::Tat | Self::ErrorRate => Direction::LowerIsBetter,
            Self::Uptime | Self::CustomerSatisfaction => Direction::HigherIsBetter,
        }
    }

    /// Decimal places sampled values are rounded to: 1 for hours, 2 for
    /// percentages.
    pub fn precision(self) -> u32 {
        match self {
            Self::Tat => 1,
            Self::Uptime | Self::ErrorRate | Self::CustomerSatisfaction => 2,
        }
    }

    pub fn default_target(self) -> f64 {
        match self {
            Self::Uptime => 99.5,
            Self::Tat => 24.0,
            Self::ErrorRate => 1.0,
            Self::CustomerSatisfaction => 85.0,
        }
    }

    pub fn default_distribution(self) -> Distribution {
        match self {
            Self::Uptime => Distribution::new(99.3, 0.5),
            Self::Tat => Distribution::new(24.0, 3.0),
            Self::ErrorRate => Distribution::new(0.7, 0.2),
            Self::CustomerSatisfaction => Distribution::new(85.0, 2.0),
        }
    }
}

impl std::fmt::Display for Kpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kpi {
    type Err = ConfigError;

    /// Accepts either the machine key (`"tat"`) or the display name
    /// (`"TAT (hrs)"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Kpi::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(wanted) || k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownKpi(s.to_string()))
    }
}

// =============================================================================
// Definitions & distributions
// =============================================================================

/// A tracked KPI together with the target it is judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub kpi: Kpi,
    pub name: String,
    pub target: f64,
    pub direction: Direction,
}

impl KpiDefinition {
    pub fn new(kpi: Kpi, target: f64) -> Self {
        Self {
            kpi,
            name: kpi.name().to_string(),
            target,
            direction: kpi.direction(),
        }
    }

    /// Definitions for all four KPIs with their default targets.
    pub fn defaults() -> Vec<Self> {
        Kpi::ALL
            .into_iter()
            .map(|k| Self::new(k, k.default_target()))
            .collect()
    }
}

/// Normal distribution parameters used to synthesize sample values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl Distribution {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}
