//! kg-eval: scores an automatically built causal KG.
//!
//! - **recall**: overlap with a curated base KG at full/type/instance level.
//! - **precision**: share of relations an LLM oracle accepts by majority vote.
//!
//! The binary entry point is `src/main.rs`; this library exposes the engines
//! for integration tests and other callers.

pub mod bootstrap;
pub mod core;
pub mod eval;
pub mod kg;
pub mod llm;
pub mod pipeline;
pub mod report;

pub use crate::bootstrap::logger;
pub use crate::core::{config, error};
