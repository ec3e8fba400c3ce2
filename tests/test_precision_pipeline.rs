//! Integration tests for the precision pipeline, driven by the scripted
//! oracle backend.
//!
//! Run with:
//!   cargo test --test test_precision_pipeline

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use kg_eval::config::Config;
use kg_eval::error::AppError;
use kg_eval::eval::{OracleService, PrecisionScores};
use kg_eval::pipeline::{PrecisionJob, run_precision};

// ── helpers ──────────────────────────────────────────────────────────────────

const QUAKE_CAUSE_EFFECT: &str =
    r#"{"cause":{"id":["Q1"],"label":["earthquake"]},"effect":{"id":["Q2"],"label":"tsunami"}}"#;

fn write_lines(path: &Path, lines: &[&str]) {
    fs::write(path, lines.join("\n") + "\n").expect("write KG");
}

async fn run(config: &Config) -> Result<(PrecisionScores, usize), AppError> {
    let job = PrecisionJob::from(&config.precision);
    let oracle = OracleService::start(&config.llm, None).await?;
    let scores = run_precision(&job, &oracle, &config.oracle).await?;
    Ok((scores, oracle.shutdown()))
}

// ── scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn majority_yes_accepts_single_pair() {
    let tmp = TempDir::new().unwrap();
    let config = Config::test_default(tmp.path(), &["yes", "yes", "no", "yes", "yes"]);
    write_lines(&config.precision.input_kg_file, &[QUAKE_CAUSE_EFFECT]);

    let (scores, calls) = run(&config).await.unwrap();
    assert_eq!(scores, PrecisionScores { full: 1.0, types: 1.0, instances: 0.0 });
    assert_eq!(calls, 5);

    let csv = fs::read_to_string(&config.precision.output_file).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "input_kg_file_name,full precision,types precision,instances precision");
    assert_eq!(lines[1], "input.jsonl,1.0000,1.0000,0.0000");

    let md = fs::read_to_string(&config.precision.output_md).unwrap();
    assert!(md.starts_with("# Precision Results\n"));
    assert!(md.contains("input.jsonl"));
}

#[tokio::test]
async fn minority_yes_rejects_pair() {
    let tmp = TempDir::new().unwrap();
    let config = Config::test_default(tmp.path(), &["Yes.", "no", "maybe", "YES", "nope"]);
    write_lines(&config.precision.input_kg_file, &[QUAKE_CAUSE_EFFECT]);

    let (scores, _) = run(&config).await.unwrap();
    assert_eq!(scores.full, 0.0);
    assert_eq!(scores.types, 0.0);
}

#[tokio::test]
async fn repeated_pairs_are_queried_once() {
    let tmp = TempDir::new().unwrap();
    let config = Config::test_default(tmp.path(), &["yes"]);
    write_lines(
        &config.precision.input_kg_file,
        &[
            r#"{"event":{"id":"Q1","label":"earthquake"},"consequences":[{"id":"Q2","label":"tsunami","examples":[{"cause":{"id":"Q10","label":"2004 quake"},"effect":{"id":"Q20","label":"2004 tsunami"}}]}]}"#,
            QUAKE_CAUSE_EFFECT,
            r#"{"event":{"id":"Q1","label":"earthquake"},"consequences":[{"id":"Q3","label":"landslide"}]}"#,
        ],
    );

    let (scores, calls) = run(&config).await.unwrap();
    // earthquake→tsunami, 2004 quake→2004 tsunami, earthquake→landslide.
    assert_eq!(calls, 3 * 5);
    assert_eq!(scores, PrecisionScores { full: 1.0, types: 1.0, instances: 1.0 });
}

#[tokio::test]
async fn concurrent_run_matches_sequential_scores() {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::test_default(tmp.path(), &["yes"]);
    config.oracle.max_concurrent_pairs = 4;
    config.oracle.parallel_samples = true;
    write_lines(
        &config.precision.input_kg_file,
        &[
            r#"{"event":{"id":"Q1","label":"earthquake"},"consequences":[{"id":"Q2","label":"tsunami"},{"id":"Q3","label":"landslide"},{"id":"Q4","label":"fire"}]}"#,
        ],
    );

    let (scores, calls) = run(&config).await.unwrap();
    assert_eq!(calls, 15);
    assert_eq!(scores, PrecisionScores { full: 1.0, types: 1.0, instances: 0.0 });
}

#[tokio::test]
async fn rerun_does_not_duplicate_rows() {
    let tmp = TempDir::new().unwrap();
    let config = Config::test_default(tmp.path(), &["yes", "yes", "no", "yes", "yes"]);
    write_lines(&config.precision.input_kg_file, &[QUAKE_CAUSE_EFFECT]);

    run(&config).await.unwrap();
    run(&config).await.unwrap();

    let csv = fs::read_to_string(&config.precision.output_file).unwrap();
    assert_eq!(csv.lines().count(), 2, "header + one row:\n{csv}");
}

#[tokio::test]
async fn malformed_line_aborts_before_any_query() {
    let tmp = TempDir::new().unwrap();
    let config = Config::test_default(tmp.path(), &["yes"]);
    write_lines(&config.precision.input_kg_file, &[QUAKE_CAUSE_EFFECT, "", "{not json"]);

    let job = PrecisionJob::from(&config.precision);
    let oracle = OracleService::start(&config.llm, None).await.unwrap();
    let err = run_precision(&job, &oracle, &config.oracle).await.unwrap_err();
    match err {
        AppError::MalformedRecord { line_no, ref line, .. } => {
            assert_eq!(line_no, 3);
            assert_eq!(line, "{not json");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(oracle.calls(), 0);
    assert!(!config.precision.output_file.exists());
}

#[tokio::test]
async fn unknown_provider_fails_at_start() {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::test_default(tmp.path(), &["yes"]);
    config.llm.provider = "nonexistent".into();

    let err = OracleService::start(&config.llm, None).await.unwrap_err();
    assert!(err.to_string().contains("nonexistent"));
}
