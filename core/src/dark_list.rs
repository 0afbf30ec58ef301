//! Dark List filter — record-level exclusion of unrepresentative calls.
//!
//! Predicates, all evaluated for every record:
//!   1. Operator exclusion   (always on: empty name or roster match)
//!   2. Duration floor       (always on)
//!   3. Weekend              (exclude_weekends)
//!   4. Holiday              (exclude_holidays)
//!   5. Test call            (exclude_test_calls)
//!   6. Low quality          (exclude_low_quality)
//!
//! A record is kept iff no predicate fires. The filter never reorders,
//! deduplicates, or fails on an individual record.

use crate::{
    calendar::{HolidayCalendar, HolidaySet},
    config::{ExclusionRuleKind, FilterConfig, PipelineConfig, QualityBounds},
    error::PipelineResult,
    record::CallRecord,
};
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    ExcludedOperator,
    BelowMinDuration,
    Weekend,
    Holiday,
    TestCall,
    LowQuality,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionReason::ExcludedOperator => "excluded_operator",
            ExclusionReason::BelowMinDuration => "below_min_duration",
            ExclusionReason::Weekend          => "weekend",
            ExclusionReason::Holiday          => "holiday",
            ExclusionReason::TestCall         => "test_call",
            ExclusionReason::LowQuality       => "low_quality",
        }
    }
}

/// Counts only; the kept records themselves live in [`FilterOutcome`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub input_count: usize,
    pub kept_count: usize,
    pub excluded_count: usize,
    /// One entry per predicate that fired. A record excluded for two reasons
    /// counts under both, so the values can sum past `excluded_count`.
    pub excluded_by_reason: BTreeMap<ExclusionReason, usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<CallRecord>,
    pub summary: FilterSummary,
}

impl FilterOutcome {
    pub fn excluded_count(&self) -> usize {
        self.summary.excluded_count
    }

    pub fn excluded_for(&self, reason: ExclusionReason) -> usize {
        self.summary.excluded_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

pub struct DarkListFilter {
    config: FilterConfig,
    quality: QualityBounds,
    exact_names: BTreeSet<String>,
    name_substrings: Vec<String>,
    test_markers: Vec<String>,
    status_fields: Vec<String>,
    calendar: Box<dyn HolidayCalendar>,
}

impl DarkListFilter {
    /// Build a filter whose holiday calendar is the config's fixed date list.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        let calendar = HolidaySet::new(config.holidays.iter().copied());
        if config.filter.exclude_holidays && calendar.is_empty() {
            log::warn!("dark list: holiday exclusion is on but the calendar has no dates");
        } else {
            log::debug!("dark list: {} holiday dates", calendar.len());
        }
        Self::with_calendar(config, Box::new(calendar))
    }

    pub fn with_calendar(
        config: &PipelineConfig,
        calendar: Box<dyn HolidayCalendar>,
    ) -> PipelineResult<Self> {
        config.validate()?;

        let mut exact_names = BTreeSet::new();
        let mut name_substrings = Vec::new();
        for rule in &config.rules {
            let value = match_key(rule.value.trim_start());
            match rule.kind {
                ExclusionRuleKind::Exact     => { exact_names.insert(value.trim_end().to_string()); }
                ExclusionRuleKind::Substring => name_substrings.push(value),
            }
        }

        Ok(Self {
            config: config.filter.clone(),
            quality: config.quality.clone(),
            exact_names,
            name_substrings,
            test_markers: match_keys(&config.settings.test_markers),
            status_fields: config.settings.status_fields.clone(),
            calendar,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Every predicate that fires for `record`, in evaluation order.
    pub fn evaluate(&self, record: &CallRecord) -> Vec<ExclusionReason> {
        let mut reasons = Vec::new();
        let normalized = record.operator_trimmed().map(match_key);
        let date = record.parsed_date();

        // 1. Operator exclusion
        let operator_excluded = match normalized.as_deref() {
            None => true,
            Some(name) => {
                self.exact_names.contains(name)
                    || self.name_substrings.iter().any(|s| name.contains(s.as_str()))
            }
        };
        if operator_excluded {
            reasons.push(ExclusionReason::ExcludedOperator);
        }

        // 2. Duration floor; NaN never clears it.
        if let Some(minutes) = record.duration_minutes {
            if !(minutes >= self.config.min_call_duration_minutes()) {
                reasons.push(ExclusionReason::BelowMinDuration);
            }
        }

        // 3. Weekend
        if self.config.exclude_weekends
            && date.is_some_and(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        {
            reasons.push(ExclusionReason::Weekend);
        }

        // 4. Holiday
        if self.config.exclude_holidays && date.is_some_and(|d| self.calendar.is_holiday(d)) {
            reasons.push(ExclusionReason::Holiday);
        }

        // 5. Test call
        if self.config.exclude_test_calls && self.is_test_call(record, normalized.as_deref()) {
            reasons.push(ExclusionReason::TestCall);
        }

        // 6. Low quality
        if self.config.exclude_low_quality && self.is_low_quality(record, date.is_some()) {
            reasons.push(ExclusionReason::LowQuality);
        }

        reasons
    }

    pub fn is_kept(&self, record: &CallRecord) -> bool {
        self.evaluate(record).is_empty()
    }

    /// Order-preserving filter over one imported batch.
    pub fn filter(&self, records: &[CallRecord]) -> FilterOutcome {
        let mut kept = Vec::with_capacity(records.len());
        let mut summary = FilterSummary {
            input_count: records.len(),
            ..FilterSummary::default()
        };

        for (index, record) in records.iter().enumerate() {
            let reasons = self.evaluate(record);
            if reasons.is_empty() {
                kept.push(record.clone());
                continue;
            }

            summary.excluded_count += 1;
            for reason in &reasons {
                *summary.excluded_by_reason.entry(*reason).or_insert(0) += 1;
            }
            log::debug!(
                "dark list: record {index} ({:?}) excluded: {}",
                record.operator_name.as_deref().unwrap_or(""),
                reasons.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", "),
            );
        }

        summary.kept_count = kept.len();
        log::info!(
            "dark list: kept {} of {} records ({} excluded)",
            summary.kept_count,
            summary.input_count,
            summary.excluded_count,
        );

        FilterOutcome { kept, summary }
    }

    fn is_test_call(&self, record: &CallRecord, normalized: Option<&str>) -> bool {
        let operator_marked = normalized
            .is_some_and(|name| self.test_markers.iter().any(|m| name.contains(m.as_str())));
        if operator_marked {
            return true;
        }

        self.status_fields.iter().any(|field| {
            record.raw_text(field).is_some_and(|status| {
                let status = match_key(&status);
                self.test_markers.iter().any(|m| status.contains(m.as_str()))
            })
        })
    }

    fn is_low_quality(&self, record: &CallRecord, date_parsed: bool) -> bool {
        if record.operator_trimmed().is_none() || !date_parsed {
            return true;
        }

        if let Some(minutes) = record.duration_minutes {
            if !minutes.is_finite() || minutes < 0.0 || minutes > self.quality.max_duration_minutes {
                return true;
            }
        }

        let rating_range = self.quality.rating_min..=self.quality.rating_max;
        [record.rating_attendance, record.rating_solution]
            .into_iter()
            .flatten()
            .any(|rating| !rating_range.contains(&rating))
    }
}

/// One-shot filter: build from `config`, run over `records`.
pub fn filter(records: &[CallRecord], config: &PipelineConfig) -> PipelineResult<FilterOutcome> {
    Ok(DarkListFilter::new(config)?.filter(records))
}

/// Canonical form for roster and marker matching: NFC, then lowercase.
/// Exports mix precomposed and decomposed accents; both must hit the roster.
pub fn match_key(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

fn match_keys(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| match_key(v.trim()))
        .filter(|v| !v.is_empty())
        .collect()
}
