//! Precision aggregator: fraction of oracle-approved pairs per granularity.

use std::collections::{HashMap, HashSet};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use crate::eval::oracle::Validator;
use crate::eval::recall::ratio;
use crate::kg::{KgRecord, Level, Pair, PairKey, relations};
use crate::llm::ProviderError;

/// Distinct label pairs in first-encounter order, each tagged with the level
/// it first appeared at. A pair recurring later, at either level, is not
/// listed again.
pub fn validation_plan(records: &[KgRecord]) -> Vec<(Pair, Level)> {
    let mut seen = HashSet::new();
    relations(records, PairKey::Label)
        .filter(|(pair, _)| seen.insert(pair.clone()))
        .collect()
}

/// Verdicts partitioned by first-encounter level. `full` is their union.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdicts {
    pub full: HashMap<Pair, bool>,
    pub types: HashMap<Pair, bool>,
    pub instances: HashMap<Pair, bool>,
}

impl Verdicts {
    pub fn insert(&mut self, pair: Pair, level: Level, verdict: bool) {
        match level {
            Level::Type => self.types.insert(pair.clone(), verdict),
            Level::Instance => self.instances.insert(pair.clone(), verdict),
        };
        self.full.insert(pair, verdict);
    }

    pub fn scores(&self) -> PrecisionScores {
        PrecisionScores {
            full: precision_score(&self.full),
            types: precision_score(&self.types),
            instances: precision_score(&self.instances),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionScores {
    pub full: f64,
    pub types: f64,
    pub instances: f64,
}

/// Fraction of verdicts that are `true`; 0 for an empty map.
pub fn precision_score(verdicts: &HashMap<Pair, bool>) -> f64 {
    ratio(verdicts.values().filter(|v| **v).count(), verdicts.len())
}

/// Validate every pair of `plan`, keeping at most `max_concurrent` pairs in
/// flight. The first oracle failure aborts the whole evaluation.
pub async fn validate_plan(
    plan: Vec<(Pair, Level)>,
    validator: &Validator<'_>,
    max_concurrent: usize,
) -> Result<Verdicts, ProviderError> {
    let total = plan.len();
    let results: Vec<(Pair, Level, bool)> = stream::iter(plan)
        .map(|(pair, level)| async move {
            let verdict = validator.validate(&pair).await?;
            Ok::<_, ProviderError>((pair, level, verdict))
        })
        .buffer_unordered(max_concurrent.max(1))
        .try_collect()
        .await?;

    let mut verdicts = Verdicts::default();
    for (pair, level, verdict) in results {
        verdicts.insert(pair, level, verdict);
    }
    info!(
        pairs = total,
        type_pairs = verdicts.types.len(),
        instance_pairs = verdicts.instances.len(),
        "validation finished"
    );
    Ok(verdicts)
}
