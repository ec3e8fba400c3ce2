//! Bootstrap layer: runs before any evaluation work.
//!
//! - **logger**: tracing-subscriber initialisation.

pub mod logger;
