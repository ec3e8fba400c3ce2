//! Causal KG data model.
//!
//! A KG file is read into canonical [`KgRecord`]s (see [`record`] for the
//! accepted wire shapes), which are then flattened into [`PairSets`] at three
//! granularities:
//!
//! - **types**: one pair per declared `source → consequence` relation;
//! - **instances**: one pair per concrete `example.cause → example.effect`;
//! - **full**: the union of both.
//!
//! Pairs can be keyed by entity identifier (set-overlap recall) or by label
//! (oracle validation), selected with [`PairKey`].

pub mod loader;
pub mod record;

use std::collections::HashSet;
use std::fmt;

pub use loader::load_records;
pub use record::{Consequence, Entity, Example, KgRecord};

/// An ordered `(source, target)` pair. Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub source: String,
    pub target: String,
}

impl Pair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.source, self.target)
    }
}

/// Where in a record a relation was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Class-level `source → consequence` relation.
    Type,
    /// Concrete example under a consequence.
    Instance,
}

/// Which entity field becomes the pair's strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKey {
    Id,
    Label,
}

impl PairKey {
    fn of<'a>(&self, entity: &'a Entity) -> &'a str {
        match self {
            PairKey::Id => &entity.id,
            PairKey::Label => &entity.label,
        }
    }

    fn pair(&self, source: &Entity, target: &Entity) -> Pair {
        Pair::new(self.of(source), self.of(target))
    }
}

/// Walk every relation in `records`, in file order, yielding the keyed pair
/// and the level it was declared at. Duplicates are yielded as they occur.
pub fn relations(records: &[KgRecord], key: PairKey) -> impl Iterator<Item = (Pair, Level)> + '_ {
    records.iter().flat_map(move |record| {
        record.consequences.iter().flat_map(move |c| {
            std::iter::once((key.pair(&record.source, &c.entity), Level::Type)).chain(
                c.examples
                    .iter()
                    .map(move |e| (key.pair(&e.cause, &e.effect), Level::Instance)),
            )
        })
    })
}

/// The three granularity views of one KG.
///
/// `full` always equals `types ∪ instances`; inserting a pair twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSets {
    pub full: HashSet<Pair>,
    pub types: HashSet<Pair>,
    pub instances: HashSet<Pair>,
}

impl PairSets {
    pub fn from_records(records: &[KgRecord], key: PairKey) -> Self {
        let mut sets = Self::default();
        for (pair, level) in relations(records, key) {
            sets.insert(pair, level);
        }
        sets
    }

    pub fn insert(&mut self, pair: Pair, level: Level) {
        match level {
            Level::Type => self.types.insert(pair.clone()),
            Level::Instance => self.instances.insert(pair.clone()),
        };
        self.full.insert(pair);
    }

    /// The set for one granularity.
    pub fn view(&self, granularity: Granularity) -> &HashSet<Pair> {
        match granularity {
            Granularity::Full => &self.full,
            Granularity::Classes => &self.types,
            Granularity::Instances => &self.instances,
        }
    }
}

/// Evaluation granularity, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Full,
    Classes,
    Instances,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Full, Granularity::Classes, Granularity::Instances];

    /// Tag written to the `eval_type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            Granularity::Full => "full",
            Granularity::Classes => "classes",
            Granularity::Instances => "instances",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
