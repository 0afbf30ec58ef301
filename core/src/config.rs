use crate::error::{PipelineError, PipelineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Per-invocation filter switches ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub exclude_weekends: bool,
    pub exclude_holidays: bool,
    pub min_call_duration_seconds: f64,
    /// Per-operator threshold. Applied after aggregation, never per record.
    pub min_operator_calls: u32,
    pub exclude_test_calls: bool,
    pub exclude_low_quality: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_weekends: false,
            exclude_holidays: false,
            min_call_duration_seconds: 10.0,
            min_operator_calls: 5,
            exclude_test_calls: true,
            exclude_low_quality: true,
        }
    }
}

impl FilterConfig {
    /// Duration floor expressed in the record's unit.
    pub fn min_call_duration_minutes(&self) -> f64 {
        self.min_call_duration_seconds / 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBounds {
    pub max_duration_minutes: f64,
    pub rating_min: f64,
    pub rating_max: f64,
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            max_duration_minutes: 300.0,
            rating_min: 0.0,
            rating_max: 5.0,
        }
    }
}

// ── Exclusion roster ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionRuleKind {
    Exact,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub kind: ExclusionRuleKind,
    pub value: String,
}

impl ExclusionRule {
    pub fn exact(value: impl Into<String>) -> Self {
        Self { kind: ExclusionRuleKind::Exact, value: value.into() }
    }

    pub fn substring(value: impl Into<String>) -> Self {
        Self { kind: ExclusionRuleKind::Substring, value: value.into() }
    }

    /// Placeholder and non-human operator labels seen in the telephony exports.
    pub fn builtin() -> Vec<ExclusionRule> {
        [
            "agentes indisponíveis",
            "agente indisponivel",
            "desl ",
            "teste",
            "sistema",
            "admin",
            "não informado",
            "null",
            "undefined",
        ]
        .into_iter()
        .map(ExclusionRule::substring)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkListSettings {
    /// Substrings that mark a call as a test or demo call.
    pub test_markers: Vec<String>,
    /// Raw field names holding the export's call status.
    pub status_fields: Vec<String>,
}

impl Default for DarkListSettings {
    fn default() -> Self {
        Self {
            test_markers: vec!["teste".into(), "demo".into()],
            status_fields: vec!["status".into()],
        }
    }
}

// ── On-disk file shapes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct FilterConfigFile {
    filter: FilterConfig,
    #[serde(default)]
    quality: QualityBounds,
    #[serde(default)]
    settings: DarkListSettings,
}

#[derive(Debug, Clone, Deserialize)]
struct ExclusionRulesFile {
    rules: Vec<ExclusionRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct HolidaysFile {
    holidays: Vec<NaiveDate>,
}

// ── Top-level config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    pub quality: QualityBounds,
    pub rules: Vec<ExclusionRule>,
    pub settings: DarkListSettings,
    pub holidays: Vec<NaiveDate>,
}

impl PipelineConfig {
    /// Load config from `{data_dir}/dark_list/`. The holiday file is optional.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let filter_path = format!("{data_dir}/dark_list/filter_config.json");
        let filter_content = std::fs::read_to_string(&filter_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {filter_path}: {e}"))?;
        let filter_file: FilterConfigFile = serde_json::from_str(&filter_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {filter_path}: {e}"))?;

        let rules_path = format!("{data_dir}/dark_list/exclusion_rules.json");
        let rules_content = std::fs::read_to_string(&rules_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rules_path}: {e}"))?;
        let rules_file: ExclusionRulesFile = serde_json::from_str(&rules_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {rules_path}: {e}"))?;

        let holidays_path = format!("{data_dir}/dark_list/holidays.json");
        let holidays = match std::fs::read_to_string(&holidays_path) {
            Ok(content) => {
                let file: HolidaysFile = serde_json::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Cannot parse {holidays_path}: {e}"))?;
                file.holidays
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No holiday calendar at {holidays_path}");
                Vec::new()
            }
            Err(e) => anyhow::bail!("Cannot read {holidays_path}: {e}"),
        };

        let config = Self {
            filter: filter_file.filter,
            quality: filter_file.quality,
            rules: rules_file.rules,
            settings: filter_file.settings,
            holidays,
        };
        config.validate()?;

        log::info!(
            "Loaded dark list config from {data_dir}: {} rules, {} holidays",
            config.rules.len(),
            config.holidays.len(),
        );
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            filter: FilterConfig::default(),
            quality: QualityBounds::default(),
            rules: ExclusionRule::builtin(),
            settings: DarkListSettings::default(),
            holidays: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Reject configurations no record could be judged against.
    pub fn validate(&self) -> PipelineResult<()> {
        let floor = self.filter.min_call_duration_seconds;
        if !floor.is_finite() || floor < 0.0 {
            return Err(PipelineError::InvalidConfig {
                field: "min_call_duration_seconds",
                reason: format!("must be a finite non-negative number, got {floor}"),
            });
        }

        let max = self.quality.max_duration_minutes;
        if max.is_nan() || max <= 0.0 {
            return Err(PipelineError::InvalidConfig {
                field: "max_duration_minutes",
                reason: format!("must be positive, got {max}"),
            });
        }

        let (lo, hi) = (self.quality.rating_min, self.quality.rating_max);
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(PipelineError::InvalidConfig {
                field: "rating_min",
                reason: format!("rating bounds [{lo}, {hi}] are not a valid range"),
            });
        }

        if let Some(rule) = self.rules.iter().find(|r| r.value.trim().is_empty()) {
            return Err(PipelineError::InvalidConfig {
                field: "rules",
                reason: format!("{:?} rule has an empty value", rule.kind),
            });
        }

        Ok(())
    }
}
