// =============================================================================
// KPI Evaluator — target variance and RAG classification
// =============================================================================
//
// RAG bands, given actual `a` and target `t`:
//
//   HigherIsBetter   Green  a >= t
//                    Amber  t*0.9 <= a < t
//                    Red    a < t*0.9
//
//   LowerIsBetter    Green  a <= t
//                    Amber  t < a <= t*1.1
//                    Red    a > t*1.1
//
// Boundary ties fall into the more favourable band.
//
// Variance % is (a - t) / t * 100 rounded to two places.  Its sign is NOT
// adjusted for direction: a negative TAT variance is good news.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::kpi::{Kpi, KpiDefinition};
use crate::synthesizer::MonthlyRecord;
use crate::types::{round_dp, Direction, Rag};

/// Lower edge of the amber band for higher-is-better KPIs, as a fraction of target.
const AMBER_FLOOR: f64 = 0.9;
/// Upper edge of the amber band for lower-is-better KPIs, as a fraction of target.
const AMBER_CEILING: f64 = 1.1;

/// One KPI of one month, judged against its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiAnnotation {
    pub kpi: Kpi,
    pub actual: f64,
    pub target: f64,
    pub variance_pct: f64,
    pub rag: Rag,
}

/// A monthly record with every KPI annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub month: NaiveDate,
    pub month_label: String,
    pub kpis: Vec<KpiAnnotation>,
}

impl AnnotatedRecord {
    pub fn get(&self, kpi: Kpi) -> Option<&KpiAnnotation> {
        self.kpis.iter().find(|a| a.kpi == kpi)
    }
}

/// Classify `actual` against `target` for a KPI moving in `direction`.
pub fn rag_status(actual: f64, target: f64, direction: Direction) -> Rag {
    match direction {
        Direction::HigherIsBetter => {
            if actual >= target {
                Rag::Green
            } else if actual >= target * AMBER_FLOOR {
                Rag::Amber
            } else {
                Rag::Red
            }
        }
        Direction::LowerIsBetter => {
            if actual <= target {
                Rag::Green
            } else if actual <= target * AMBER_CEILING {
                Rag::Amber
            } else {
                Rag::Red
            }
        }
    }
}

/// Percentage difference of `actual` from `target`, rounded to 2 places.
///
/// `target` must be non-zero; [`Evaluator::new`] enforces this for
/// configured definitions.
pub fn variance_pct(actual: f64, target: f64) -> f64 {
    round_dp((actual - target) / target * 100.0, 2)
}

/// Annotate every KPI of `record` that has a definition.
///
/// KPIs the record carries no value for are skipped.
pub fn annotate(record: &MonthlyRecord, definitions: &[KpiDefinition]) -> AnnotatedRecord {
    let kpis = definitions
        .iter()
        .filter_map(|def| {
            let Some(actual) = record.value(def.kpi) else {
                debug!(month = %record.month_label, kpi = %def.kpi, "no value for KPI, skipping");
                return None;
            };
            Some(KpiAnnotation {
                kpi: def.kpi,
                actual,
                target: def.target,
                variance_pct: variance_pct(actual, def.target),
                rag: rag_status(actual, def.target, def.direction),
            })
        })
        .collect();

    AnnotatedRecord {
        month: record.month,
        month_label: record.month_label.clone(),
        kpis,
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Validated set of KPI definitions.
#[derive(Debug, Clone)]
pub struct Evaluator {
    definitions: Vec<KpiDefinition>,
}

impl Evaluator {
    /// Reject zero, negative and non-finite targets up front so that
    /// annotation can never divide by zero.
    pub fn new(definitions: Vec<KpiDefinition>) -> Result<Self, ConfigError> {
        for def in &definitions {
            if !def.target.is_finite() || def.target <= 0.0 {
                return Err(ConfigError::NonPositiveTarget {
                    kpi: def.kpi,
                    target: def.target,
                });
            }
        }
        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &[KpiDefinition] {
        &self.definitions
    }

    pub fn annotate(&self, record: &MonthlyRecord) -> AnnotatedRecord {
        annotate(record, &self.definitions)
    }

    /// Annotate `records`, one output per input, order preserved.
    pub fn annotate_all(&self, records: &[MonthlyRecord]) -> Vec<AnnotatedRecord> {
        let annotated: Vec<_> = records.iter().map(|r| self.annotate(r)).collect();
        info!(records = annotated.len(), "records annotated");
        annotated
    }
}
