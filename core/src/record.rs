//! Imported call records: the pipeline's input boundary.
//!
//! Records arrive already parsed from the spreadsheet/CSV import as a JSON
//! array with camelCase keys. Anything the import step adds beyond the known
//! columns lands in `raw_fields` untouched.

use crate::{
    error::{PipelineError, PipelineResult},
    types::{CallId, Minutes, OperatorName, Rating},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<CallId>,
    #[serde(default)]
    pub operator_name: Option<OperatorName>,
    #[serde(default)]
    pub call_date: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<Minutes>,
    #[serde(default)]
    pub rating_attendance: Option<Rating>,
    #[serde(default)]
    pub rating_solution: Option<Rating>,
    #[serde(flatten)]
    pub raw_fields: serde_json::Map<String, serde_json::Value>,
}

impl CallRecord {
    pub fn new(operator_name: impl Into<String>) -> Self {
        Self {
            operator_name: Some(operator_name.into()),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.call_date = Some(date.into());
        self
    }

    pub fn with_duration(mut self, minutes: Minutes) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_ratings(mut self, attendance: Option<Rating>, solution: Option<Rating>) -> Self {
        self.rating_attendance = attendance;
        self.rating_solution = solution;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.raw_fields.insert(key.into(), value);
        self
    }

    /// Operator name with surrounding whitespace removed, if any remains.
    pub fn operator_trimmed(&self) -> Option<&str> {
        self.operator_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Calendar date of the call, in the record's own local calendar.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.call_date.as_deref().and_then(parse_call_date)
    }

    /// Case-insensitive lookup of a raw field rendered as text.
    pub fn raw_text(&self, key: &str) -> Option<String> {
        self.raw_fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
    }
}

/// Parse the date formats the dashboard exports produce. No timezone
/// conversion: offset timestamps keep the date of their own offset.
pub fn parse_call_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Decode an imported batch. The top level must be a JSON array; individual
/// malformed records are the filter's business, not a decode error.
pub fn records_from_json(json: &str) -> PipelineResult<Vec<CallRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(PipelineError::InvalidInput {
                reason: format!("expected an array of call records, got {}", json_kind(&other)),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(PipelineError::InvalidInput {
                    reason: format!("record {i} is {}, not an object", json_kind(&item)),
                });
            }
            Ok(lenient_record(item))
        })
        .collect()
}

/// Build a record from a JSON object without failing on bad columns. A text
/// column of the wrong type becomes absent; a numeric column that is present
/// but unreadable becomes NaN, which no duration or rating bound accepts.
fn lenient_record(item: serde_json::Value) -> CallRecord {
    let serde_json::Value::Object(mut map) = item else {
        return CallRecord::default();
    };

    let mut text = |key: &str| match map.remove(key) {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let call_id = text("callId");
    let operator_name = text("operatorName");
    let call_date = text("callDate");

    let mut number = |key: &str| match map.remove(key) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::Number(n)) => Some(n.as_f64().unwrap_or(f64::NAN)),
        Some(serde_json::Value::String(s)) => {
            Some(s.trim().replace(',', ".").parse().unwrap_or(f64::NAN))
        }
        Some(_) => Some(f64::NAN),
    };
    let duration_minutes = number("durationMinutes");
    let rating_attendance = number("ratingAttendance");
    let rating_solution = number("ratingSolution");

    CallRecord {
        call_id,
        operator_name,
        call_date,
        duration_minutes,
        rating_attendance,
        rating_solution,
        raw_fields: map,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_iso_and_brazilian_dates() {
        let iso = parse_call_date("2024-03-09").unwrap();
        let br = parse_call_date("09/03/2024").unwrap();
        assert_eq!(iso, br);
        assert_eq!(iso.day(), 9);
    }

    #[test]
    fn parses_timestamps_without_timezone_shift() {
        let d = parse_call_date("2024-03-09T23:30:00-03:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        let d = parse_call_date("09/03/2024 08:15").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn garbage_dates_do_not_parse() {
        assert!(parse_call_date("").is_none());
        assert!(parse_call_date("not a date").is_none());
        assert!(parse_call_date("2024-13-45").is_none());
    }

    #[test]
    fn unknown_columns_land_in_raw_fields() {
        let json = r#"[{"operatorName":"Ana","callDate":"2024-03-04","durationMinutes":2.5,"Status":"Demo"}]"#;
        let records = records_from_json(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_text("status").as_deref(), Some("Demo"));
        assert_eq!(records[0].duration_minutes, Some(2.5));
    }

    #[test]
    fn unreadable_numbers_stay_present() {
        let json = r#"[{"operatorName":null,"durationMinutes":"abc","ratingSolution":"4,5",
                        "ratingAttendance":"1.234,5","callDate":""}]"#;
        let records = records_from_json(json).unwrap();
        assert_eq!(records[0].operator_name, None);
        assert!(records[0].duration_minutes.is_some_and(f64::is_nan));
        assert!(records[0].rating_attendance.is_some_and(f64::is_nan));
        assert_eq!(records[0].rating_solution, Some(4.5));
    }

    #[test]
    fn blank_and_null_numbers_are_absent() {
        let json = r#"[{"durationMinutes":"  ","ratingSolution":null,"ratingAttendance":true}]"#;
        let records = records_from_json(json).unwrap();
        assert_eq!(records[0].duration_minutes, None);
        assert_eq!(records[0].rating_solution, None);
        assert!(records[0].rating_attendance.is_some_and(f64::is_nan));
    }

    #[test]
    fn non_array_batch_is_an_input_error() {
        let err = records_from_json(r#"{"operatorName":"Ana"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));

        let err = records_from_json(r#"[1, 2]"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn operator_trimmed_rejects_blank_names() {
        assert_eq!(CallRecord::new("  ").operator_trimmed(), None);
        assert_eq!(CallRecord::new(" Ana ").operator_trimmed(), Some("Ana"));
        assert_eq!(CallRecord::default().operator_trimmed(), None);
    }
}
