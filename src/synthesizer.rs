// =============================================================================
// Data Synthesizer — sample monthly KPI records
// =============================================================================
//
// Produces N consecutive calendar months of KPI values, each drawn
// independently from Normal(mean, std_dev) and rounded to the KPI's fixed
// precision.  A seed can be injected for reproducible output; without one
// the RNG is seeded from OS entropy.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::kpi::{Distribution, Kpi};
use crate::types::round_dp;

/// One month of raw KPI actuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// First day of the month.
    pub month: NaiveDate,
    /// e.g. "Feb 2025".
    pub month_label: String,
    pub values: BTreeMap<Kpi, f64>,
}

impl MonthlyRecord {
    pub fn new(month: NaiveDate, values: BTreeMap<Kpi, f64>) -> Self {
        Self {
            month,
            month_label: month_label(month),
            values,
        }
    }

    pub fn value(&self, kpi: Kpi) -> Option<f64> {
        self.values.get(&kpi).copied()
    }
}

/// Format a month as "Mon YYYY".
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

/// Parameters for a synthesizer run.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub start_month: NaiveDate,
    pub months: usize,
    pub distributions: BTreeMap<Kpi, Distribution>,
    pub seed: Option<u64>,
}

/// A validated synthesizer.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    months: Vec<NaiveDate>,
    samplers: Vec<(Kpi, Normal<f64>)>,
    seed: Option<u64>,
}

impl Synthesizer {
    /// Validate `config` and build the per-KPI samplers.
    ///
    /// KPIs without a configured distribution fall back to their defaults.
    pub fn new(config: SynthesizerConfig) -> Result<Self, ConfigError> {
        if config.months < 1 {
            return Err(ConfigError::NoMonths);
        }

        // The whole window has to be representable before anything is sampled.
        let start_month = config.start_month.with_day(1).unwrap_or(config.start_month);
        let last_month = u32::try_from(config.months - 1)
            .ok()
            .and_then(|n| start_month.checked_add_months(Months::new(n)));
        if last_month.is_none() {
            return Err(ConfigError::WindowOutOfRange {
                start: start_month,
                months: config.months,
            });
        }
        let months: Vec<NaiveDate> = std::iter::successors(Some(start_month), |m| {
            m.checked_add_months(Months::new(1))
        })
        .take(config.months)
        .collect();

        let mut samplers = Vec::with_capacity(Kpi::ALL.len());
        for kpi in Kpi::ALL {
            let dist = config
                .distributions
                .get(&kpi)
                .copied()
                .unwrap_or_else(|| kpi.default_distribution());

            if !dist.mean.is_finite() {
                return Err(ConfigError::InvalidMean { kpi, mean: dist.mean });
            }
            if !dist.std_dev.is_finite() || dist.std_dev < 0.0 {
                return Err(ConfigError::InvalidStdDev {
                    kpi,
                    std_dev: dist.std_dev,
                });
            }

            let normal = Normal::new(dist.mean, dist.std_dev).map_err(|_| {
                ConfigError::InvalidStdDev {
                    kpi,
                    std_dev: dist.std_dev,
                }
            })?;
            samplers.push((kpi, normal));
        }

        Ok(Self {
            months,
            samplers,
            seed: config.seed,
        })
    }

    /// Generate the records in chronological order.
    pub fn generate(&self) -> Vec<MonthlyRecord> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut records = Vec::with_capacity(self.months.len());
        for &month in &self.months {
            let values = self
                .samplers
                .iter()
                .map(|(kpi, normal)| (*kpi, round_dp(normal.sample(&mut rng), kpi.precision())))
                .collect();
            let record = MonthlyRecord::new(month, values);
            debug!(month = %record.month_label, values = ?record.values, "record synthesized");
            records.push(record);
        }
        records
    }
}

/// Validate `config` and generate its records in one step.
pub fn synthesize(config: SynthesizerConfig) -> Result<Vec<MonthlyRecord>, ConfigError> {
    Ok(Synthesizer::new(config)?.generate())
}
