//! End-to-end evaluation runs.
//!
//! Each run loads its KGs, scores them, appends new rows to the CSV table and
//! regenerates the Markdown report.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};

use crate::config::{OracleConfig, PrecisionConfig, RecallConfig};
use crate::error::AppError;
use crate::eval::{OracleService, PrecisionScores, RecallMetrics, Validator, evaluate_recall, validate_plan, validation_plan};
use crate::kg::{self, Granularity, PairKey, PairSets};
use crate::report::{self, PRECISION_HEADER, RECALL_HEADER, ResultTable};

/// Recall run inputs, after CLI overrides.
#[derive(Debug, Clone)]
pub struct RecallJob {
    pub base_kg_file: PathBuf,
    pub input_kg_file: PathBuf,
    pub output_file: PathBuf,
    pub output_md: PathBuf,
}

impl From<&RecallConfig> for RecallJob {
    fn from(c: &RecallConfig) -> Self {
        Self {
            base_kg_file: c.base_kg_file.clone(),
            input_kg_file: c.input_kg_file.clone(),
            output_file: c.output_file.clone(),
            output_md: c.output_md.clone(),
        }
    }
}

/// Precision run inputs, after CLI overrides.
#[derive(Debug, Clone)]
pub struct PrecisionJob {
    pub input_kg_file: PathBuf,
    pub output_file: PathBuf,
    pub output_md: PathBuf,
}

impl From<&PrecisionConfig> for PrecisionJob {
    fn from(c: &PrecisionConfig) -> Self {
        Self {
            input_kg_file: c.input_kg_file.clone(),
            output_file: c.output_file.clone(),
            output_md: c.output_md.clone(),
        }
    }
}

/// Outcome of a recall run: the granularities that were scored, and those
/// skipped because their baseline is empty.
#[derive(Debug, Default)]
pub struct RecallOutcome {
    pub scored: Vec<(Granularity, RecallMetrics)>,
    pub skipped: Vec<(Granularity, AppError)>,
}

impl RecallOutcome {
    pub fn get(&self, granularity: Granularity) -> Option<&RecallMetrics> {
        self.scored.iter().find(|(g, _)| *g == granularity).map(|(_, m)| m)
    }

    /// `Ok` with the scored metrics when nothing was skipped, otherwise the
    /// first skipped granularity's error.
    pub fn into_result(self) -> Result<Vec<(Granularity, RecallMetrics)>, AppError> {
        match self.skipped.into_iter().next() {
            Some((_, e)) => Err(e),
            None => Ok(self.scored),
        }
    }
}

/// Compare the input KG with the base KG at every granularity.
///
/// A granularity with an empty baseline is logged and skipped; the rows of
/// the others are still written. Load and write failures abort the run.
pub fn run_recall(job: &RecallJob) -> Result<RecallOutcome, AppError> {
    let started = Instant::now();
    info!(?job, "starting recall evaluation");

    let base_records = kg::load_records(&job.base_kg_file)?;
    let base = PairSets::from_records(&base_records, PairKey::Id);
    kg::loader::log_counts("base", &job.base_kg_file, base_records.len(), &base);

    let input_records = kg::load_records(&job.input_kg_file)?;
    let input = PairSets::from_records(&input_records, PairKey::Id);
    kg::loader::log_counts("input", &job.input_kg_file, input_records.len(), &input);

    let mut outcome = RecallOutcome::default();
    for granularity in Granularity::ALL {
        let m = match evaluate_recall(input.view(granularity), base.view(granularity), granularity) {
            Ok(m) => m,
            Err(e @ AppError::EmptyBaseline { .. }) => {
                error!(eval_type = %granularity, error = %e, "granularity skipped");
                outcome.skipped.push((granularity, e));
                continue;
            }
            Err(e) => return Err(e),
        };
        info!(
            eval_type = %granularity,
            hit_count = m.hit_count,
            rel_count = m.rel_count,
            base_kg_size = m.base_kg_size,
            precision = m.precision,
            recall = m.recall,
            base_count = m.base_count,
            base_coverage = m.base_coverage,
            "recall computed"
        );
        outcome.scored.push((granularity, m));
    }

    let input_name = report::file_name(&job.input_kg_file);
    let base_name = report::file_name(&job.base_kg_file);
    let mut table = ResultTable::open(&job.output_file, &RECALL_HEADER)?;
    for (granularity, m) in &outcome.scored {
        table.append(recall_row(&input_name, &base_name, *granularity, m))?;
    }
    table.write_markdown(&job.output_md, "Recall Results")?;

    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        scored = outcome.scored.len(),
        skipped = outcome.skipped.len(),
        "recall evaluation done"
    );
    Ok(outcome)
}

/// Validate every distinct label pair of the input KG with the oracle and
/// score the fraction judged true.
pub async fn run_precision(
    job: &PrecisionJob,
    oracle: &OracleService,
    config: &OracleConfig,
) -> Result<PrecisionScores, AppError> {
    let started = Instant::now();
    info!(?job, samples = config.samples, "starting precision evaluation");

    let records = kg::load_records(&job.input_kg_file)?;
    let plan = validation_plan(&records);
    info!(path = %job.input_kg_file.display(), pairs = plan.len(), "validation plan ready");

    let validator = Validator::new(oracle, config);
    let verdicts = validate_plan(plan, &validator, config.max_concurrent_pairs).await?;
    let scores = verdicts.scores();
    info!(
        relations = verdicts.full.len(),
        type_relations = verdicts.types.len(),
        instance_relations = verdicts.instances.len(),
        full = scores.full,
        types = scores.types,
        instances = scores.instances,
        "precision computed"
    );

    let mut table = ResultTable::open(&job.output_file, &PRECISION_HEADER)?;
    table.append(precision_row(&report::file_name(&job.input_kg_file), &scores))?;
    table.write_markdown(&job.output_md, "Precision Results")?;

    info!(elapsed_secs = started.elapsed().as_secs_f64(), "precision evaluation done");
    Ok(scores)
}

fn recall_row(input: &str, base: &str, granularity: Granularity, m: &RecallMetrics) -> Vec<String> {
    vec![
        input.to_string(),
        base.to_string(),
        granularity.tag().to_string(),
        format!("{:.4}", m.recall),
        m.hit_count.to_string(),
        m.rel_count.to_string(),
        m.base_kg_size.to_string(),
        m.base_count.to_string(),
        format!("{:.4}", m.base_coverage),
    ]
}

fn precision_row(input: &str, s: &PrecisionScores) -> Vec<String> {
    vec![
        input.to_string(),
        format!("{:.4}", s.full),
        format!("{:.4}", s.types),
        format!("{:.4}", s.instances),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_row_formats_four_decimals() {
        let m = RecallMetrics {
            hit_count: 1,
            rel_count: 3,
            base_kg_size: 3,
            precision: 1.0 / 3.0,
            recall: 1.0 / 3.0,
            base_count: 2,
            base_coverage: 2.0 / 3.0,
        };
        assert_eq!(
            recall_row("in.jsonl", "base.jsonl", Granularity::Classes, &m),
            vec!["in.jsonl", "base.jsonl", "classes", "0.3333", "1", "3", "3", "2", "0.6667"]
        );
    }

    #[test]
    fn precision_row_formats_four_decimals() {
        let s = PrecisionScores { full: 0.5, types: 1.0, instances: 0.0 };
        assert_eq!(precision_row("kg.jsonl", &s), vec!["kg.jsonl", "0.5000", "1.0000", "0.0000"]);
    }
}
