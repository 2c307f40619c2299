// =============================================================================
// Configuration errors
// =============================================================================
//
// Everything that can go wrong in the dashboard core is a bad configuration,
// and all of it is caught when a component is constructed.  Annotation itself
// never fails.

use chrono::NaiveDate;
use thiserror::Error;

use crate::kpi::Kpi;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("target for {kpi} must be a positive number, got {target}")]
    NonPositiveTarget { kpi: Kpi, target: f64 },

    #[error("synthesizer needs at least one month")]
    NoMonths,

    #[error("{months} months starting {start} run past the supported calendar range")]
    WindowOutOfRange { start: NaiveDate, months: usize },

    #[error("standard deviation for {kpi} must be finite and >= 0, got {std_dev}")]
    InvalidStdDev { kpi: Kpi, std_dev: f64 },

    #[error("mean for {kpi} must be finite, got {mean}")]
    InvalidMean { kpi: Kpi, mean: f64 },

    #[error("unknown KPI '{0}'")]
    UnknownKpi(String),
}
