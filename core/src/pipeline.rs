//! The dashboard pipeline — from imported records to render-ready rows.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Dark list filter          (record level)
//!   2. Aggregation               (per operator)
//!   3. Minimum operator calls    (per operator)
//!   4. Viewer-in-the-middle ordering
//!   5. Display names             (pseudonymization)
//!
//! RULES:
//!   - Every stage is pure; the pipeline holds no per-run state.
//!   - Only configuration problems fail a run. Bad records are excluded,
//!     identity mismatches fall back to pseudonyms and original order.

use crate::{
    aggregate::{aggregate, enforce_min_operator_calls, OperatorMetric, SortKey},
    calendar::HolidayCalendar,
    config::PipelineConfig,
    dark_list::{DarkListFilter, FilterSummary},
    error::PipelineResult,
    privacy::{display_name, is_viewer_operator, prioritize_viewer_in_middle, ViewerIdentity},
    record::CallRecord,
    types::OperatorName,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub hide_names: bool,
    pub sort_key: SortKey,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            hide_names: true,
            sort_key: SortKey::TotalCalls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub position: usize,
    pub display_name: String,
    pub is_viewer: bool,
    pub metric: OperatorMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter: FilterSummary,
    pub dropped_operators: Vec<OperatorName>,
    pub rows: Vec<DisplayRow>,
}

impl DashboardView {
    pub fn viewer_row(&self) -> Option<&DisplayRow> {
        self.rows.iter().find(|r| r.is_viewer)
    }
}

pub struct Pipeline {
    filter: DarkListFilter,
}

impl Pipeline {
    /// Build a pipeline whose holiday calendar is the config's date list.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        Ok(Self { filter: DarkListFilter::new(config)? })
    }

    pub fn with_calendar(
        config: &PipelineConfig,
        calendar: Box<dyn HolidayCalendar>,
    ) -> PipelineResult<Self> {
        Ok(Self { filter: DarkListFilter::with_calendar(config, calendar)? })
    }

    pub fn dark_list(&self) -> &DarkListFilter {
        &self.filter
    }

    /// Run every stage over one imported batch for one viewer.
    pub fn run(
        &self,
        records: &[CallRecord],
        viewer: &ViewerIdentity,
        options: &ViewOptions,
    ) -> DashboardView {
        // 1. Dark list
        let outcome = self.filter.filter(records);

        // 2–3. Aggregate, then apply the per-operator threshold
        let metrics = aggregate(&outcome.kept);
        let min_calls = enforce_min_operator_calls(metrics, self.filter.config().min_operator_calls);

        // 4. Ordering
        let ordered = prioritize_viewer_in_middle(&min_calls.kept, viewer, &options.sort_key);

        // 5. Display names
        let rows: Vec<DisplayRow> = ordered
            .into_iter()
            .enumerate()
            .map(|(position, metric)| DisplayRow {
                position,
                display_name: display_name(&metric.operator_name, position, viewer, options.hide_names),
                is_viewer: is_viewer_operator(Some(&metric.operator_name), viewer),
                metric,
            })
            .collect();

        log::info!(
            "pipeline: {} operators displayed, {} dropped, viewer {}",
            rows.len(),
            min_calls.dropped.len(),
            if rows.iter().any(|r| r.is_viewer) { "found" } else { "not found" },
        );

        DashboardView {
            filter: outcome.summary,
            dropped_operators: min_calls.dropped,
            rows,
        }
    }
}
