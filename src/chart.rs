// =============================================================================
// Trend Chart Projection
// =============================================================================
//
// Pulls a single KPI's (month, actual) series out of the annotated records,
// together with its flat target line, for whichever render target draws the
// chart.

use serde::{Deserialize, Serialize};

use crate::evaluator::AnnotatedRecord;
use crate::kpi::Kpi;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month_label: String,
    pub actual: f64,
}

/// Chart description for one KPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChart {
    pub kpi: Kpi,
    pub name: String,
    pub target: f64,
    pub points: Vec<TrendPoint>,
}

impl TrendChart {
    /// `(min, max)` over the actuals and the target line.
    pub fn value_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .map(|p| p.actual)
            .fold((self.target, self.target), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

/// Project `kpi` out of `records`.  `None` if no record carries it.
pub fn trend(records: &[AnnotatedRecord], kpi: Kpi) -> Option<TrendChart> {
    let mut target = None;
    let points: Vec<_> = records
        .iter()
        .filter_map(|r| {
            r.get(kpi).map(|a| {
                target.get_or_insert(a.target);
                TrendPoint {
                    month_label: r.month_label.clone(),
                    actual: a.actual,
                }
            })
        })
        .collect();

    Some(TrendChart {
        kpi,
        name: kpi.name().to_string(),
        target: target?,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::annotate;
    use crate::kpi::KpiDefinition;
    use crate::synthesizer::MonthlyRecord;
    use chrono::NaiveDate;

    fn records() -> Vec<AnnotatedRecord> {
        let defs = KpiDefinition::defaults();
        [(2, 23.0), (3, 26.5), (4, 24.0)]
            .into_iter()
            .map(|(m, tat)| {
                let r = MonthlyRecord::new(
                    NaiveDate::from_ymd_opt(2025, m, 1).unwrap(),
                    [(Kpi::Tat, tat), (Kpi::Uptime, 99.0)].into_iter().collect(),
                );
                annotate(&r, &defs)
            })
            .collect()
    }

    #[test]
    fn projects_series_in_order_with_target() {
        let chart = trend(&records(), Kpi::Tat).unwrap();
        assert_eq!(chart.name, "TAT (hrs)");
        assert_eq!(chart.target, 24.0);
        let labels: Vec<_> = chart.points.iter().map(|p| p.month_label.as_str()).collect();
        assert_eq!(labels, vec!["Feb 2025", "Mar 2025", "Apr 2025"]);
        let actuals: Vec<_> = chart.points.iter().map(|p| p.actual).collect();
        assert_eq!(actuals, vec![23.0, 26.5, 24.0]);
    }

    #[test]
    fn value_range_includes_target() {
        let chart = trend(&records(), Kpi::Uptime).unwrap();
        assert_eq!(chart.value_range(), (99.0, 99.5));
    }

    #[test]
    fn missing_kpi_gives_none() {
        assert!(trend(&records(), Kpi::ErrorRate).is_none());
        assert!(trend(&[], Kpi::Tat).is_none());
    }
}
