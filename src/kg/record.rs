//! KG record decoding.
//!
//! Two wire shapes are accepted for the same record and normalised here, so
//! nothing past this module sees the difference:
//!
//! ```text
//! {"event": {"id": "Q1", "label": "earthquake"},
//!  "consequences": [{"id": "Q2", "label": "tsunami", "examples": [...]}]}
//!
//! {"cause": {"id": ["Q1"], "label": ["earthquake"]},
//!  "effect": {"id": ["Q2"], "label": "tsunami"}}
//! ```
//!
//! `id` and `label` may be a string or a list of strings anywhere; a list
//! contributes its first element. A singular `effect` becomes a one-element
//! consequence list and takes precedence over `consequences`; `event` takes
//! precedence over `cause`.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub cause: Entity,
    pub effect: Entity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consequence {
    pub entity: Entity,
    pub examples: Vec<Example>,
}

/// Canonical form of one KG line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KgRecord {
    pub source: Entity,
    pub consequences: Vec<Consequence>,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing 'event' or 'cause' field")]
    MissingSource,
    #[error("missing 'effect' or 'consequences' field")]
    MissingTarget,
    #[error("empty '{0}' list")]
    EmptyList(&'static str),
}

impl KgRecord {
    /// Decode one JSON line into the canonical record.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let raw: RawRecord = serde_json::from_str(line)?;

        let source = raw
            .event
            .or(raw.cause)
            .ok_or(RecordError::MissingSource)?
            .resolve()?;

        let consequences = match (raw.effect, raw.consequences) {
            (Some(effect), _) => vec![Consequence { entity: effect.resolve()?, examples: Vec::new() }],
            (None, Some(list)) => list
                .into_iter()
                .map(RawConsequence::resolve)
                .collect::<Result<_, _>>()?,
            (None, None) => return Err(RecordError::MissingTarget),
        };

        Ok(Self { source, consequences })
    }
}

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawRecord {
    event: Option<RawEntity>,
    cause: Option<RawEntity>,
    consequences: Option<Vec<RawConsequence>>,
    effect: Option<RawEntity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn first(self, field: &'static str) -> Result<String, RecordError> {
        match self {
            OneOrMany::One(s) => Ok(s),
            OneOrMany::Many(v) => v.into_iter().next().ok_or(RecordError::EmptyList(field)),
        }
    }
}

#[derive(Deserialize)]
struct RawEntity {
    id: OneOrMany,
    label: OneOrMany,
}

impl RawEntity {
    fn resolve(self) -> Result<Entity, RecordError> {
        Ok(Entity { id: self.id.first("id")?, label: self.label.first("label")? })
    }
}

#[derive(Deserialize)]
struct RawConsequence {
    id: OneOrMany,
    label: OneOrMany,
    #[serde(default)]
    examples: Option<Vec<RawExample>>,
}

impl RawConsequence {
    fn resolve(self) -> Result<Consequence, RecordError> {
        let examples = self
            .examples
            .unwrap_or_default()
            .into_iter()
            .map(|e| -> Result<Example, RecordError> {
                Ok(Example { cause: e.cause.resolve()?, effect: e.effect.resolve()? })
            })
            .collect::<Result<_, _>>()?;
        let entity = RawEntity { id: self.id, label: self.label }.resolve()?;
        Ok(Consequence { entity, examples })
    }
}

#[derive(Deserialize)]
struct RawExample {
    cause: RawEntity,
    effect: RawEntity,
}
