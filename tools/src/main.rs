//! darklist-runner: headless dashboard pipeline runner.
//!
//! Usage:
//!   darklist-runner --records calls.json --data-dir ./data --viewer ana.lima@empresa.com
//!   darklist-runner --synthetic 500 --seed 42 --hide-names --sort avg_rating_solution
//!   darklist-runner --synthetic 500 --json

use anyhow::Result;
use darklist_core::{
    aggregate::SortKey,
    config::PipelineConfig,
    pipeline::{DashboardView, Pipeline, ViewOptions},
    privacy::ViewerIdentity,
    record::{records_from_json, CallRecord},
    sample::SampleGenerator,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let synthetic = parse_arg(&args, "--synthetic", 0usize);
    let json_out = has_flag(&args, "--json");
    let hide_names = has_flag(&args, "--hide-names");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let records_path = flag_value(&args, "--records");
    let sort_key: SortKey = flag_value(&args, "--sort").unwrap_or("total_calls").parse()?;

    let mut viewer = flag_value(&args, "--viewer")
        .map(ViewerIdentity::from_email)
        .unwrap_or_default();
    if let Some(name) = flag_value(&args, "--viewer-operator") {
        viewer = viewer.with_operator(name);
    }

    let config = if Path::new(data_dir).join("dark_list").is_dir() {
        PipelineConfig::load(data_dir)?
    } else {
        log::warn!("No dark list config under {data_dir}; using built-in defaults");
        PipelineConfig::default_test()
    };

    let records: Vec<CallRecord> = match records_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
            records_from_json(&content)?
        }
        None if synthetic > 0 => SampleGenerator::new(seed).generate(synthetic),
        None => anyhow::bail!("pass --records <file> or --synthetic <count>"),
    };

    let pipeline = Pipeline::new(&config)?;
    let options = ViewOptions { hide_names, sort_key };
    let view = pipeline.run(&records, &viewer, &options);

    if json_out {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_summary(&view);
    }
    Ok(())
}

fn print_summary(view: &DashboardView) {
    let f = &view.filter;
    println!("=== DARK LIST ===");
    println!("  input:          {}", f.input_count);
    println!("  kept:           {}", f.kept_count);
    println!("  excluded:       {}", f.excluded_count);
    for (reason, count) in &f.excluded_by_reason {
        println!("    {:<20} {count}", reason.as_str());
    }

    if !view.dropped_operators.is_empty() {
        println!();
        println!("  below minimum calls: {}", view.dropped_operators.len());
    }

    println!();
    println!("=== OPERATORS ===");
    if view.rows.is_empty() {
        println!("  (no operators left after filtering)");
    }
    for row in &view.rows {
        let m = &row.metric;
        println!(
            "  {:>2}. {:<28} calls: {:>4} | avg: {:>5.1} min | attendance: {} | solution: {}{}",
            row.position + 1,
            row.display_name,
            m.total_calls,
            m.avg_duration_minutes,
            fmt_rating(m.avg_rating_attendance),
            fmt_rating(m.avg_rating_solution),
            if row.is_viewer { "  <- you" } else { "" },
        );
    }
}

fn fmt_rating(rating: Option<f64>) -> String {
    rating.map(|r| format!("{r:.2}")).unwrap_or_else(|| "-".into())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
