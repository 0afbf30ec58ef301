//! Synthetic call batches for tests and the runner's `--synthetic` mode.
//!
//! A batch looks like a month of exports: a fixed operator roster, dates
//! spread over consecutive days (weekends included), skewed durations,
//! mostly-present ratings, and a small share of defective rows (placeholder
//! operators, short or absurd durations, bad dates, out-of-range ratings,
//! demo statuses). Same seed, same batch.

use crate::{
    name_generator::NameGenerator,
    record::CallRecord,
    rng::{self, SampleRng, StreamSlot},
};
use chrono::{Duration, NaiveDate};
use rand::{seq::SliceRandom, Rng};

pub struct SampleGenerator {
    roster: Vec<String>,
    start: NaiveDate,
    days: i64,
    defect_rate: f64,
    operator_rng: SampleRng,
    calendar_rng: SampleRng,
    duration_rng: SampleRng,
    rating_rng: SampleRng,
    defect_rng: SampleRng,
    identity_rng: SampleRng,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        let mut operator_rng = rng::stream(seed, StreamSlot::Operator);
        let roster = NameGenerator::generate_roster(&mut operator_rng, 12);
        Self {
            roster,
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
            days: 30,
            defect_rate: 0.15,
            operator_rng,
            calendar_rng: rng::stream(seed, StreamSlot::Calendar),
            duration_rng: rng::stream(seed, StreamSlot::Duration),
            rating_rng: rng::stream(seed, StreamSlot::Rating),
            defect_rng: rng::stream(seed, StreamSlot::Defect),
            identity_rng: rng::stream(seed, StreamSlot::Identity),
        }
    }

    pub fn with_defect_rate(mut self, rate: f64) -> Self {
        self.defect_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub fn generate(&mut self, n: usize) -> Vec<CallRecord> {
        (0..n).map(|_| self.next_record()).collect()
    }

    fn next_record(&mut self) -> CallRecord {
        let operator = self.roster.choose(&mut self.operator_rng).cloned().unwrap_or_default();
        let offset = self.calendar_rng.gen_range(0..self.days);
        let date = self.start + Duration::days(offset);
        let minutes = rng::call_minutes(&mut self.duration_rng);

        let attendance = self.rating_rng.gen_bool(0.8).then(|| rng::rating(&mut self.rating_rng));
        let solution = self.rating_rng.gen_bool(0.8).then(|| rng::rating(&mut self.rating_rng));

        let id = uuid::Builder::from_random_bytes(self.identity_rng.gen()).into_uuid();
        let mut record = CallRecord::new(operator)
            .with_date(date.format("%Y-%m-%d").to_string())
            .with_duration((minutes * 100.0).round() / 100.0)
            .with_ratings(attendance, solution)
            .with_field("status", serde_json::json!("finalizada"));
        record.call_id = Some(id.to_string());

        if self.defect_rng.gen_bool(self.defect_rate) {
            self.inject_defect(&mut record);
        }
        record
    }

    fn inject_defect(&mut self, record: &mut CallRecord) {
        match self.defect_rng.gen_range(0..7) {
            0 => record.operator_name = Some(NameGenerator::generate_placeholder(&mut self.operator_rng)),
            1 => record.operator_name = Some(String::new()),
            2 => record.duration_minutes = Some(0.05),
            3 => record.duration_minutes = Some(480.0),
            4 => record.call_date = Some("sem data".into()),
            5 => record.rating_solution = Some(7.0),
            _ => {
                record.raw_fields.insert("status".into(), serde_json::json!("Demo"));
            }
        }
    }
}
