//! Per-operator aggregation of kept records, and the minimum-calls pass.
//!
//! Aggregation groups by trimmed operator name in first-seen order. The
//! minimum-calls pass runs on the aggregates because `min_operator_calls`
//! is a per-operator threshold, not a per-record one.

use crate::{
    error::PipelineError,
    record::CallRecord,
    types::{Minutes, OperatorName, Rating},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorMetric {
    pub operator_name: OperatorName,
    pub total_calls: u64,
    pub total_duration_minutes: Minutes,
    pub avg_duration_minutes: Minutes,
    pub avg_rating_attendance: Option<Rating>,
    pub avg_rating_solution: Option<Rating>,
    /// Caller-supplied aggregates, addressable through `SortKey::Extra`.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl OperatorMetric {
    pub fn new(operator_name: impl Into<String>, total_calls: u64) -> Self {
        Self {
            operator_name: operator_name.into(),
            total_calls,
            total_duration_minutes: 0.0,
            avg_duration_minutes: 0.0,
            avg_rating_attendance: None,
            avg_rating_solution: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    TotalCalls,
    TotalDurationMinutes,
    AvgDurationMinutes,
    AvgRatingAttendance,
    AvgRatingSolution,
    Extra(String),
}

impl SortKey {
    /// Value used for ranking. Missing values rank as zero.
    pub fn value(&self, metric: &OperatorMetric) -> f64 {
        match self {
            SortKey::TotalCalls           => metric.total_calls as f64,
            SortKey::TotalDurationMinutes => metric.total_duration_minutes,
            SortKey::AvgDurationMinutes   => metric.avg_duration_minutes,
            SortKey::AvgRatingAttendance  => metric.avg_rating_attendance.unwrap_or(0.0),
            SortKey::AvgRatingSolution    => metric.avg_rating_solution.unwrap_or(0.0),
            SortKey::Extra(key)           => metric.extra.get(key).copied().unwrap_or(0.0),
        }
    }
}

impl FromStr for SortKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "total_calls"            => SortKey::TotalCalls,
            "total_duration_minutes" => SortKey::TotalDurationMinutes,
            "avg_duration_minutes"   => SortKey::AvgDurationMinutes,
            "avg_rating_attendance"  => SortKey::AvgRatingAttendance,
            "avg_rating_solution"    => SortKey::AvgRatingSolution,
            other => match other.strip_prefix("extra:") {
                Some(key) if !key.is_empty() => SortKey::Extra(key.to_string()),
                _ => {
                    return Err(PipelineError::InvalidInput {
                        reason: format!("unknown sort key '{other}'"),
                    })
                }
            },
        })
    }
}

#[derive(Default)]
struct Accumulator {
    calls: u64,
    duration: f64,
    attendance_sum: f64,
    attendance_n: u64,
    solution_sum: f64,
    solution_n: u64,
}

fn mean(sum: f64, n: u64) -> Option<f64> {
    (n > 0).then(|| sum / n as f64)
}

/// Roll kept records up into one metric per operator.
pub fn aggregate(records: &[CallRecord]) -> Vec<OperatorMetric> {
    let mut order: Vec<&str> = Vec::new();
    let mut acc: HashMap<&str, Accumulator> = HashMap::new();

    for record in records {
        let Some(name) = record.operator_trimmed() else {
            log::warn!("aggregate: skipping record without operator name");
            continue;
        };
        let entry = acc.entry(name).or_insert_with(|| {
            order.push(name);
            Accumulator::default()
        });

        entry.calls += 1;
        // Unreadable columns arrive as NaN; they must not poison the sums.
        entry.duration += record.duration_minutes.filter(|d| d.is_finite()).unwrap_or(0.0);
        if let Some(r) = record.rating_attendance.filter(|r| r.is_finite()) {
            entry.attendance_sum += r;
            entry.attendance_n += 1;
        }
        if let Some(r) = record.rating_solution.filter(|r| r.is_finite()) {
            entry.solution_sum += r;
            entry.solution_n += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|name| {
            let a = acc.remove(name)?;
            Some(OperatorMetric {
                operator_name: name.to_string(),
                total_calls: a.calls,
                total_duration_minutes: a.duration,
                avg_duration_minutes: a.duration / a.calls as f64,
                avg_rating_attendance: mean(a.attendance_sum, a.attendance_n),
                avg_rating_solution: mean(a.solution_sum, a.solution_n),
                extra: BTreeMap::new(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinCallsOutcome {
    pub kept: Vec<OperatorMetric>,
    pub dropped: Vec<OperatorName>,
}

/// Drop operators with fewer than `min_operator_calls` kept calls.
pub fn enforce_min_operator_calls(
    metrics: Vec<OperatorMetric>,
    min_operator_calls: u32,
) -> MinCallsOutcome {
    let (kept, dropped): (Vec<_>, Vec<_>) = metrics
        .into_iter()
        .partition(|m| m.total_calls >= u64::from(min_operator_calls));

    if !dropped.is_empty() {
        log::info!(
            "min operator calls: dropped {} operator(s) below {min_operator_calls} calls",
            dropped.len(),
        );
    }

    MinCallsOutcome {
        kept,
        dropped: dropped.into_iter().map(|m| m.operator_name).collect(),
    }
}
