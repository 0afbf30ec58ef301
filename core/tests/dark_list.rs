use darklist_core::{
    config::{ExclusionRule, FilterConfig, PipelineConfig},
    dark_list::{DarkListFilter, ExclusionReason},
    record::{records_from_json, CallRecord},
    sample::SampleGenerator,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

// 2024-03-04 is a Monday.
fn call(name: &str, minutes: f64) -> CallRecord {
    CallRecord::new(name)
        .with_date("2024-03-04")
        .with_duration(minutes)
        .with_ratings(Some(4.0), Some(4.0))
}

fn filter_with(filter: FilterConfig) -> DarkListFilter {
    DarkListFilter::new(&PipelineConfig::default_test().with_filter(filter)).unwrap()
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn empty_operator_is_excluded_with_default_config() {
    let filter = filter_with(FilterConfig::default());
    let outcome = filter.filter(&[call("", 5.0)]);

    assert!(outcome.kept.is_empty());
    assert_eq!(outcome.excluded_count(), 1);
    assert_eq!(outcome.excluded_for(ExclusionReason::ExcludedOperator), 1);
}

#[test]
fn ten_second_floor_splits_short_calls() {
    let filter = filter_with(FilterConfig {
        min_call_duration_seconds: 10.0,
        ..FilterConfig::default()
    });

    assert!(!filter.is_kept(&call("João Silva", 0.1)));
    assert!(filter.is_kept(&call("João Silva", 0.2)));
}

#[test]
fn test_call_switch_controls_marked_operators() {
    // "teste" is also a built-in roster substring, so the roster here
    // carries only the non-test placeholders.
    let mut cfg = PipelineConfig::default_test();
    cfg.rules.retain(|r| r.value != "teste");

    let strict = DarkListFilter::new(&cfg).unwrap();
    assert_eq!(strict.evaluate(&call("Teste Bot", 5.0)), vec![ExclusionReason::TestCall]);

    cfg.filter.exclude_test_calls = false;
    let lenient = DarkListFilter::new(&cfg).unwrap();
    assert!(lenient.is_kept(&call("Teste Bot", 5.0)));
}

#[test]
fn built_in_roster_excludes_teste_regardless_of_switch() {
    let filter = filter_with(FilterConfig {
        exclude_test_calls: false,
        ..FilterConfig::default()
    });
    assert_eq!(
        filter.evaluate(&call("Teste Bot", 5.0)),
        vec![ExclusionReason::ExcludedOperator]
    );
}

#[test]
fn injected_roster_replaces_built_in_rules() {
    let mut cfg = PipelineConfig::default_test();
    cfg.rules = vec![ExclusionRule::exact("Supervisor Geral"), ExclusionRule::substring("bot")];
    let filter = DarkListFilter::new(&cfg).unwrap();

    assert!(!filter.is_kept(&call("supervisor geral", 3.0)));
    assert!(!filter.is_kept(&call("Robotina", 3.0)));
    assert!(filter.is_kept(&call("Sistema Novo", 3.0)));
}

#[test]
fn decomposed_placeholder_is_excluded_like_precomposed() {
    let filter = filter_with(FilterConfig::default());
    let nfd = call("Agentes Indisponi\u{301}veis", 3.0);
    let nfc = call("Agentes Indisponíveis", 3.0);

    assert_eq!(filter.evaluate(&nfd), filter.evaluate(&nfc));
    assert!(!filter.is_kept(&nfd));
}

#[test]
fn unreadable_duration_and_rating_are_excluded() {
    let json = r#"[
        {"operatorName":"Ana Lima","callDate":"2024-03-04","durationMinutes":"abc","ratingAttendance":4},
        {"operatorName":"Ana Lima","callDate":"2024-03-04","durationMinutes":3.0,"ratingAttendance":"nota dez"},
        {"operatorName":"Ana Lima","callDate":"2024-03-04","durationMinutes":"3,5","ratingSolution":"1.234,5"},
        {"operatorName":"Ana Lima","callDate":"2024-03-04","durationMinutes":"3,5","ratingSolution":"4"}
    ]"#;
    let records = records_from_json(json).unwrap();
    let outcome = filter_with(FilterConfig::default()).filter(&records);

    assert_eq!(outcome.kept.len(), 1);
    assert_eq!(outcome.kept[0].duration_minutes, Some(3.5));
    assert_eq!(outcome.excluded_for(ExclusionReason::BelowMinDuration), 1);
    assert_eq!(outcome.excluded_for(ExclusionReason::LowQuality), 3);
}

// ── Properties over synthetic batches ────────────────────────────────────────

#[test]
fn filtering_is_idempotent() {
    let records = SampleGenerator::new(11).generate(400);
    let filter = filter_with(FilterConfig { exclude_weekends: true, ..FilterConfig::default() });

    let once = filter.filter(&records);
    let twice = filter.filter(&once.kept);

    assert_eq!(once.kept, twice.kept);
    assert_eq!(twice.excluded_count(), 0);
}

#[test]
fn output_is_an_ordered_subsequence() {
    let records = SampleGenerator::new(12).generate(400);
    let outcome = filter_with(FilterConfig::default()).filter(&records);

    let mut cursor = records.iter();
    for kept in &outcome.kept {
        assert!(
            cursor.any(|r| r == kept),
            "kept record {:?} out of order or not from input",
            kept.call_id
        );
    }
    assert_eq!(outcome.kept.len() + outcome.excluded_count(), records.len());
}

#[test]
fn kept_records_honor_floor_and_rating_bounds() {
    let records = SampleGenerator::new(13).with_defect_rate(0.4).generate(600);
    let filter = filter_with(FilterConfig { min_call_duration_seconds: 45.0, ..FilterConfig::default() });
    let outcome = filter.filter(&records);

    assert!(outcome.excluded_count() > 0, "defective batch should lose records");
    for r in &outcome.kept {
        if let Some(d) = r.duration_minutes {
            assert!(d >= 45.0 / 60.0, "kept duration {d} below floor");
        }
        for rating in [r.rating_attendance, r.rating_solution].into_iter().flatten() {
            assert!((0.0..=5.0).contains(&rating), "kept rating {rating} out of range");
        }
        assert!(r.operator_trimmed().is_some());
        assert!(r.parsed_date().is_some());
    }
}

#[test]
fn same_batch_same_outcome() {
    let records = SampleGenerator::new(14).generate(300);
    let filter = filter_with(FilterConfig::default());
    assert_eq!(filter.filter(&records), filter.filter(&records));
}
