//! Recall engine: set overlap between an evaluation KG and a base KG.

use std::collections::HashSet;

use crate::error::AppError;
use crate::kg::{Granularity, Pair};

/// Overlap statistics for one granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallMetrics {
    /// `|E ∩ B|`
    pub hit_count: usize,
    /// `|E|`
    pub rel_count: usize,
    /// `|B|`
    pub base_kg_size: usize,
    /// `hit_count / rel_count`, or 0 for an empty evaluation set.
    pub precision: f64,
    /// `hit_count / base_kg_size`
    pub recall: f64,
    /// Sources appearing in both KGs, regardless of target.
    pub base_count: usize,
    /// `base_count / |sources(B)|`
    pub base_coverage: f64,
}

/// Compare evaluation pairs `eval` against baseline pairs `base`.
///
/// An empty baseline leaves recall undefined and is reported as
/// [`AppError::EmptyBaseline`] for `granularity`.
pub fn evaluate_recall(
    eval: &HashSet<Pair>,
    base: &HashSet<Pair>,
    granularity: Granularity,
) -> Result<RecallMetrics, AppError> {
    if base.is_empty() {
        return Err(AppError::EmptyBaseline { granularity: granularity.tag().to_string() });
    }

    let base_sources: HashSet<&str> = base.iter().map(|p| p.source.as_str()).collect();
    let eval_sources: HashSet<&str> = eval.iter().map(|p| p.source.as_str()).collect();
    let base_count = base_sources.intersection(&eval_sources).count();

    let hit_count = eval.intersection(base).count();
    let rel_count = eval.len();
    let base_kg_size = base.len();

    Ok(RecallMetrics {
        hit_count,
        rel_count,
        base_kg_size,
        precision: ratio(hit_count, rel_count),
        recall: ratio(hit_count, base_kg_size),
        base_count,
        base_coverage: ratio(base_count, base_sources.len()),
    })
}

/// `num / den`, with an empty denominator defined as 0.
pub(crate) fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
