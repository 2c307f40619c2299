// =============================================================================
// Runtime Configuration — dashboard settings with atomic save
// =============================================================================
//
// Every tunable of a dashboard run lives here: the synthesized window, the
// seed, the per-KPI targets and sampling distributions, the initially
// selected KPI and the optional API bind address.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::kpi::{Distribution, Kpi, KpiDefinition};
use crate::synthesizer::SynthesizerConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_start_month() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default()
}

fn default_months() -> usize {
    6
}

fn default_selected_kpi() -> Kpi {
    Kpi::Uptime
}

// =============================================================================
// KpiSettings
// =============================================================================

/// Target and sampling distribution for one KPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSettings {
    pub target: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl KpiSettings {
    pub fn default_for(kpi: Kpi) -> Self {
        let dist = kpi.default_distribution();
        Self {
            target: kpi.default_target(),
            mean: dist.mean,
            std_dev: dist.std_dev,
        }
    }
}

fn default_kpis() -> BTreeMap<Kpi, KpiSettings> {
    Kpi::ALL
        .into_iter()
        .map(|k| (k, KpiSettings::default_for(k)))
        .collect()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for a dashboard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// First synthesized month; any day within the month is accepted.
    #[serde(default = "default_start_month")]
    pub start_month: NaiveDate,

    /// Number of consecutive months to synthesize.
    #[serde(default = "default_months")]
    pub months: usize,

    /// Fixed RNG seed.  `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Per-KPI target and distribution.  KPIs missing from the file keep
    /// their built-in settings.
    #[serde(default = "default_kpis")]
    pub kpis: BTreeMap<Kpi, KpiSettings>,

    /// KPI charted on startup.
    #[serde(default = "default_selected_kpi")]
    pub selected_kpi: Kpi,

    /// Address for the REST API.  `None` prints the report and exits.
    #[serde(default)]
    pub bind_addr: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            start_month: default_start_month(),
            months: default_months(),
            seed: None,
            kpis: default_kpis(),
            selected_kpi: default_selected_kpi(),
            bind_addr: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            start_month = %config.start_month,
            months = config.months,
            seed = ?config.seed,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Load `path`, falling back to defaults with a warning.
    ///
    /// A missing file is created with the defaults so there is something to
    /// edit on the next run.  A file that exists but cannot be read or parsed
    /// is left untouched.
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                let defaults = Self::default();
                if !path.exists() {
                    if let Err(e) = defaults.save(path) {
                        warn!(error = %e, "Failed to write default config");
                    }
                }
                defaults
            }
        }
    }

    /// Apply `MBR_*` environment overrides.  Unparsable values are ignored
    /// with a warning.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("MBR_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid MBR_SEED"),
            }
        }
        if let Some(raw) = lookup("MBR_MONTHS") {
            match raw.trim().parse::<usize>() {
                Ok(months) => self.months = months,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid MBR_MONTHS"),
            }
        }
        if let Some(raw) = lookup("MBR_SELECTED_KPI") {
            match raw.parse::<Kpi>() {
                Ok(kpi) => self.selected_kpi = kpi,
                Err(e) => warn!(error = %e, "ignoring invalid MBR_SELECTED_KPI"),
            }
        }
        if let Some(addr) = lookup("MBR_BIND_ADDR") {
            let addr = addr.trim();
            self.bind_addr = (!addr.is_empty()).then(|| addr.to_string());
        }
    }

    /// Effective settings for `kpi`, falling back to built-in defaults.
    pub fn kpi_settings(&self, kpi: Kpi) -> KpiSettings {
        self.kpis
            .get(&kpi)
            .copied()
            .unwrap_or_else(|| KpiSettings::default_for(kpi))
    }

    /// Target definitions for every tracked KPI.
    pub fn kpi_definitions(&self) -> Vec<KpiDefinition> {
        KpiDefinition::defaults()
            .into_iter()
            .map(|mut def| {
                def.target = self.kpi_settings(def.kpi).target;
                def
            })
            .collect()
    }

    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            start_month: self.start_month,
            months: self.months,
            distributions: Kpi::ALL
                .into_iter()
                .map(|k| {
                    let s = self.kpi_settings(k);
                    (k, Distribution::new(s.mean, s.std_dev))
                })
                .collect(),
            seed: self.seed,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.start_month, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(cfg.months, 6);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.kpis.len(), 4);
        assert_eq!(cfg.selected_kpi, Kpi::Uptime);
        assert!(cfg.bind_addr.is_none());
        assert!((cfg.kpi_settings(Kpi::Tat).target - 24.0).abs() < f64::EPSILON);
        assert!((cfg.kpi_settings(Kpi::Uptime).mean - 99.3).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.months, 6);
        assert_eq!(cfg.selected_kpi, Kpi::Uptime);
        assert_eq!(cfg.kpi_definitions(), KpiDefinition::defaults());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "seed": 9,
            "selected_kpi": "tat",
            "kpis": { "tat": { "target": 20.0, "mean": 22.0, "std_dev": 1.0 } }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.selected_kpi, Kpi::Tat);
        assert!((cfg.kpi_settings(Kpi::Tat).target - 20.0).abs() < f64::EPSILON);
        // Not mentioned in the file, so the built-in settings apply.
        assert_eq!(
            cfg.kpi_settings(Kpi::ErrorRate),
            KpiSettings::default_for(Kpi::ErrorRate)
        );
        assert_eq!(cfg.kpi_definitions().len(), 4);
    }

    #[test]
    fn synthesizer_config_mirrors_settings() {
        let mut cfg = RuntimeConfig::default();
        cfg.seed = Some(5);
        cfg.kpis.insert(
            Kpi::ErrorRate,
            KpiSettings {
                target: 1.0,
                mean: 0.4,
                std_dev: 0.0,
            },
        );
        let syn = cfg.synthesizer_config();
        assert_eq!(syn.months, 6);
        assert_eq!(syn.seed, Some(5));
        assert_eq!(syn.distributions[&Kpi::ErrorRate], Distribution::new(0.4, 0.0));
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|key| match key {
            "MBR_SEED" => Some("123".into()),
            "MBR_MONTHS" => Some("not-a-number".into()),
            "MBR_SELECTED_KPI" => Some("Error Rate %".into()),
            "MBR_BIND_ADDR" => Some("127.0.0.1:3002".into()),
            _ => None,
        });
        assert_eq!(cfg.seed, Some(123));
        assert_eq!(cfg.months, 6);
        assert_eq!(cfg.selected_kpi, Kpi::ErrorRate);
        assert_eq!(cfg.bind_addr.as_deref(), Some("127.0.0.1:3002"));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("mbr_config_{}.json", std::process::id()));
        let mut cfg = RuntimeConfig::default();
        cfg.seed = Some(77);
        cfg.months = 3;
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.seed, Some(77));
        assert_eq!(loaded.months, 3);
        assert_eq!(loaded.kpis, cfg.kpis);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/definitely/not/here/mbr_config.json").is_err());
    }

    #[test]
    fn load_or_init_writes_defaults_when_missing() {
        let path = std::env::temp_dir().join(format!("mbr_init_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let cfg = RuntimeConfig::load_or_init(&path);
        assert_eq!(cfg.months, default_months());
        assert!(path.exists());

        let written = RuntimeConfig::load(&path).unwrap();
        assert_eq!(written.months, cfg.months);
        assert_eq!(written.kpis, cfg.kpis);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_or_init_leaves_unparsable_file_alone() {
        let path = std::env::temp_dir().join(format!("mbr_broken_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();

        let cfg = RuntimeConfig::load_or_init(&path);
        assert_eq!(cfg.months, default_months());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
        let _ = std::fs::remove_file(&path);
    }
}
