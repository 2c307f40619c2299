// =============================================================================
// Central Application State — MBR Dashboard API
// =============================================================================
//
// Shared across the axum handlers via `Arc<AppState>`.  The dashboard
// snapshot is immutable; the only mutable piece is the KPI currently selected
// for the trend chart.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the chart selection.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use crate::chart::TrendChart;
use crate::dashboard::Dashboard;
use crate::evaluator::AnnotatedRecord;
use crate::kpi::{Kpi, KpiDefinition};
use crate::risk::RiskNarrative;

/// Serialisable view of the whole dashboard for `GET /api/v1/dashboard`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub state_version: u64,
    pub generated_at: String,
    pub selected_kpi: Kpi,
    pub definitions: &'a [KpiDefinition],
    pub records: &'a [AnnotatedRecord],
    pub risks: &'a [RiskNarrative],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendChart>,
}

pub struct AppState {
    /// Incremented whenever the selection changes so polling clients can
    /// tell a fresh chart is available.
    pub state_version: AtomicU64,

    pub dashboard: Dashboard,

    selected_kpi: RwLock<Kpi>,

    /// Instant when the server was started.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(dashboard: Dashboard, selected_kpi: Kpi) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            dashboard,
            selected_kpi: RwLock::new(selected_kpi),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Chart Selection ─────────────────────────────────────────────────

    pub fn selected_kpi(&self) -> Kpi {
        *self.selected_kpi.read()
    }

    /// Change the charted KPI.  Returns `true` if the selection changed.
    pub fn select_kpi(&self, kpi: Kpi) -> bool {
        let previous = {
            let mut selected = self.selected_kpi.write();
            std::mem::replace(&mut *selected, kpi)
        };
        if previous == kpi {
            return false;
        }
        self.increment_version();
        info!(from = %previous, to = %kpi, "chart selection changed");
        true
    }

    /// Trend for `kpi`, or for the current selection when `None`.
    pub fn trend(&self, kpi: Option<Kpi>) -> Option<TrendChart> {
        self.dashboard.trend(kpi.unwrap_or_else(|| self.selected_kpi()))
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    pub fn build_snapshot(&self) -> DashboardSnapshot<'_> {
        let selected_kpi = self.selected_kpi();
        DashboardSnapshot {
            state_version: self.current_state_version(),
            generated_at: self.dashboard.generated_at.to_rfc3339(),
            selected_kpi,
            definitions: &self.dashboard.definitions,
            records: &self.dashboard.records,
            risks: &self.dashboard.risks,
            trend: self.dashboard.trend(selected_kpi),
        }
    }
}
