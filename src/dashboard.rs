// =============================================================================
// Dashboard Pipeline — synthesize → annotate → summarize
// =============================================================================
//
// Builds the immutable snapshot that every render target reads from.  The
// snapshot is constructed once per run and never mutated afterwards.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::chart::{trend, TrendChart};
use crate::error::ConfigError;
use crate::evaluator::{AnnotatedRecord, Evaluator};
use crate::kpi::{Kpi, KpiDefinition};
use crate::risk::{summarize_risk, RiskNarrative};
use crate::runtime_config::RuntimeConfig;
use crate::synthesizer::synthesize;

/// Everything the dashboard shows, computed up front.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub definitions: Vec<KpiDefinition>,
    pub records: Vec<AnnotatedRecord>,
    pub risks: Vec<RiskNarrative>,
}

impl Dashboard {
    /// Run the full pipeline for `config`.
    ///
    /// Targets and the synthesizer window are validated before any data is
    /// generated, so a bad configuration is reported here and nowhere deeper.
    pub fn build(config: &RuntimeConfig) -> Result<Self, ConfigError> {
        let evaluator = Evaluator::new(config.kpi_definitions())?;
        let monthly = synthesize(config.synthesizer_config())?;
        let records = evaluator.annotate_all(&monthly);
        let risks = records.last().map(summarize_risk).unwrap_or_default();

        info!(
            months = records.len(),
            first = records.first().map(|r| r.month_label.as_str()).unwrap_or("-"),
            last = records.last().map(|r| r.month_label.as_str()).unwrap_or("-"),
            risks = risks.len(),
            "dashboard built"
        );

        Ok(Self {
            generated_at: Utc::now(),
            definitions: evaluator.definitions().to_vec(),
            records,
            risks,
        })
    }

    /// Most recent annotated month.
    pub fn latest(&self) -> Option<&AnnotatedRecord> {
        self.records.last()
    }

    pub fn trend(&self, kpi: Kpi) -> Option<TrendChart> {
        trend(&self.records, kpi)
    }
}
