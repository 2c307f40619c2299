// =============================================================================
// Risk Summary — narrative banners for the latest month
// =============================================================================
//
// Two fixed rules, evaluated against the most recent annotated record only:
//
//   1. TAT above target                    -> Error   (ticket backlog)
//   2. Customer Satisfaction below target  -> Warning (delays)
//
// No other KPI produces a narrative.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluator::AnnotatedRecord;
use crate::kpi::Kpi;
use crate::types::Severity;

pub const TAT_NARRATIVE: &str =
    "Turnaround Time exceeded target. Root cause: Ticket backlog. Action: Hire temp agents.";

pub const CSAT_NARRATIVE: &str =
    "Customer Satisfaction is below target. Root cause: Delays. Action: Improve response workflow.";

/// A risk banner shown under the KPI table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskNarrative {
    pub severity: Severity,
    pub kpi: Kpi,
    pub message: String,
}

impl RiskNarrative {
    fn new(severity: Severity, kpi: Kpi, message: &str) -> Self {
        Self {
            severity,
            kpi,
            message: message.to_string(),
        }
    }
}

/// Derive the risk narratives for `latest`, Error before Warning.
pub fn summarize_risk(latest: &AnnotatedRecord) -> Vec<RiskNarrative> {
    let mut risks = Vec::new();

    if let Some(tat) = latest.get(Kpi::Tat) {
        if tat.actual > tat.target {
            risks.push(RiskNarrative::new(Severity::Error, Kpi::Tat, TAT_NARRATIVE));
        }
    }

    if let Some(csat) = latest.get(Kpi::CustomerSatisfaction) {
        if csat.actual < csat.target {
            risks.push(RiskNarrative::new(
                Severity::Warning,
                Kpi::CustomerSatisfaction,
                CSAT_NARRATIVE,
            ));
        }
    }

    for risk in &risks {
        warn!(
            month = %latest.month_label,
            severity = %risk.severity,
            kpi = %risk.kpi,
            "{}",
            risk.message
        );
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::annotate;
    use crate::kpi::KpiDefinition;
    use crate::synthesizer::MonthlyRecord;
    use chrono::NaiveDate;

    fn latest(tat: f64, csat: f64) -> AnnotatedRecord {
        let record = MonthlyRecord::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            [
                (Kpi::Uptime, 99.6),
                (Kpi::Tat, tat),
                (Kpi::ErrorRate, 0.7),
                (Kpi::CustomerSatisfaction, csat),
            ]
            .into_iter()
            .collect(),
        );
        annotate(&record, &KpiDefinition::defaults())
    }

    #[test]
    fn both_missed_gives_error_then_warning() {
        let risks = summarize_risk(&latest(27.0, 83.0));
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].severity, Severity::Error);
        assert_eq!(risks[0].kpi, Kpi::Tat);
        assert!(risks[0].message.contains("Ticket backlog"));
        assert!(risks[0].message.contains("Hire temp agents."));
        assert_eq!(risks[1].severity, Severity::Warning);
        assert_eq!(risks[1].kpi, Kpi::CustomerSatisfaction);
        assert!(risks[1].message.contains("Delays"));
        assert!(risks[1].message.contains("Improve response workflow."));
    }

    #[test]
    fn targets_met_gives_nothing() {
        assert!(summarize_risk(&latest(22.5, 88.0)).is_empty());
    }

    #[test]
    fn exactly_on_target_is_not_a_risk() {
        assert!(summarize_risk(&latest(24.0, 85.0)).is_empty());
    }

    #[test]
    fn only_csat_missed() {
        let risks = summarize_risk(&latest(23.0, 84.9));
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::Warning);
    }

    #[test]
    fn other_kpis_never_raise_narratives() {
        let record = MonthlyRecord::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            [(Kpi::Uptime, 50.0), (Kpi::ErrorRate, 9.0)].into_iter().collect(),
        );
        let annotated = annotate(&record, &KpiDefinition::defaults());
        assert!(summarize_risk(&annotated).is_empty());
    }
}
