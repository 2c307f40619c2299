// =============================================================================
// Console Report — plain-text rendering of the dashboard
// =============================================================================
//
// Layout:
//   1. Title
//   2. KPI Performance Overview   (Month, then Actual/Target/Var %/RAG per KPI;
//                                  `*` marks each column's highest actual)
//   3. <KPI> Trend                (bar per month, scaled to the series range)
//   4. Risk Summary & Action Plan
// =============================================================================

use std::fmt;

use crate::chart::TrendChart;
use crate::dashboard::Dashboard;
use crate::kpi::Kpi;

/// Width of the longest trend bar.
const BAR_WIDTH: usize = 30;

/// Marker appended to the highest actual of each KPI column.
const MAX_MARKER: char = '*';

/// The whole dashboard rendered with `selected` as the charted KPI.
pub struct Report<'a> {
    dashboard: &'a Dashboard,
    selected: Kpi,
}

impl<'a> Report<'a> {
    pub fn new(dashboard: &'a Dashboard, selected: Kpi) -> Self {
        Self { dashboard, selected }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dashboard = self.dashboard;
        let selected = self.selected;

        writeln!(f, "📊 Monthly Business Review Dashboard")?;
        writeln!(f)?;

        writeln!(f, "### KPI Performance Overview")?;
        write_table(f, dashboard)?;
        writeln!(f)?;

        match dashboard.trend(selected) {
            Some(chart) => write_trend(f, &chart)?,
            None => writeln!(f, "No data for {selected}")?,
        }
        writeln!(f)?;

        writeln!(f, "### ⚠ Risk Summary & Action Plan")?;
        if dashboard.risks.is_empty() {
            writeln!(f, "No risks: latest month meets TAT and Customer Satisfaction targets.")?;
        }
        for risk in &dashboard.risks {
            writeln!(f, "[{}] {}", risk.severity, risk.message)?;
        }
        Ok(())
    }
}

/// Highest actual recorded for `kpi`, if any record carries it.
fn column_max(dashboard: &Dashboard, kpi: Kpi) -> Option<f64> {
    dashboard
        .records
        .iter()
        .filter_map(|r| r.get(kpi).map(|a| a.actual))
        .reduce(f64::max)
}

fn write_table(f: &mut fmt::Formatter<'_>, dashboard: &Dashboard) -> fmt::Result {
    let maxima: Vec<_> = dashboard
        .definitions
        .iter()
        .map(|def| column_max(dashboard, def.kpi))
        .collect();

    write!(f, "{:<10}", "Month")?;
    for def in &dashboard.definitions {
        write!(f, " | {:^30}", def.name)?;
    }
    writeln!(f)?;

    write!(f, "{:<10}", "")?;
    for _ in &dashboard.definitions {
        write!(f, " | {:>7}  {:>7} {:>9} {:>3}", "Actual", "Target", "Var %", "RAG")?;
    }
    writeln!(f)?;

    for record in &dashboard.records {
        write!(f, "{:<10}", record.month_label)?;
        for (def, max) in dashboard.definitions.iter().zip(&maxima) {
            match record.get(def.kpi) {
                Some(a) => {
                    let marker = if Some(a.actual) == *max { MAX_MARKER } else { ' ' };
                    write!(
                        f,
                        " | {:>7.2}{} {:>7.2} {:>+9.2} {:>3}",
                        a.actual,
                        marker,
                        a.target,
                        a.variance_pct,
                        a.rag.symbol()
                    )?
                }
                None => write!(f, " | {:^30}", "-")?,
            }
        }
        writeln!(f)?;
    }
    writeln!(f, "({MAX_MARKER} = highest actual in the column)")
}

fn write_trend(f: &mut fmt::Formatter<'_>, chart: &TrendChart) -> fmt::Result {
    writeln!(f, "### 📈 {} Trend (target {:.2})", chart.name, chart.target)?;

    let (lo, hi) = chart.value_range();
    let span = hi - lo;
    let scale = |v: f64| -> usize {
        if span <= 0.0 {
            BAR_WIDTH
        } else {
            (((v - lo) / span) * BAR_WIDTH as f64).round() as usize
        }
    };
    let target_col = scale(chart.target);

    for point in &chart.points {
        let len = scale(point.actual).max(1);
        let mut bar: Vec<char> = std::iter::repeat('█')
            .take(len)
            .chain(std::iter::repeat(' ').take(BAR_WIDTH + 1 - len))
            .collect();
        if let Some(c) = bar.get_mut(target_col) {
            *c = '┆';
        }
        let bar: String = bar.into_iter().collect();
        writeln!(f, "{:<10} {} {:.2}", point.month_label, bar, point.actual)?;
    }
    Ok(())
}
