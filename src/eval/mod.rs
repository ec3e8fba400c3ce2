//! Scoring engines.
//!
//! - **recall**: set overlap against a curated base KG.
//! - **oracle**: LLM-backed majority-vote validation of label pairs.
//! - **cache**: per-pair verdict memoization shared by concurrent validations.
//! - **precision**: first-encounter partitioning and fraction-true scores.

pub mod cache;
pub mod oracle;
pub mod precision;
pub mod recall;

pub use oracle::{OracleService, Validator};
pub use precision::{PrecisionScores, Verdicts, precision_score, validate_plan, validation_plan};
pub use recall::{RecallMetrics, evaluate_recall};
