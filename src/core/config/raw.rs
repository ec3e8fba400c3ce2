//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape, the serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub eval: RawEval,
    #[serde(default)]
    pub recall: RawRecall,
    #[serde(default)]
    pub precision: RawPrecision,
    #[serde(default)]
    pub oracle: RawOracle,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawEval {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawEval {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

// ── Pipelines ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawRecall {
    #[serde(default = "default_base_kg_file")]
    pub base_kg_file: String,
    #[serde(default = "default_recall_input_kg_file")]
    pub input_kg_file: String,
    #[serde(default = "default_recall_output_file")]
    pub output_file: String,
    #[serde(default = "default_recall_output_md")]
    pub output_md: String,
}

impl Default for RawRecall {
    fn default() -> Self {
        Self {
            base_kg_file: default_base_kg_file(),
            input_kg_file: default_recall_input_kg_file(),
            output_file: default_recall_output_file(),
            output_md: default_recall_output_md(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawPrecision {
    #[serde(default = "default_base_kg_file")]
    pub input_kg_file: String,
    #[serde(default = "default_precision_output_file")]
    pub output_file: String,
    #[serde(default = "default_precision_output_md")]
    pub output_md: String,
}

impl Default for RawPrecision {
    fn default() -> Self {
        Self {
            input_kg_file: default_base_kg_file(),
            output_file: default_precision_output_file(),
            output_md: default_precision_output_md(),
        }
    }
}

// ── Oracle ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawOracle {
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// `"instruction"`, `"question"`, or a custom template string.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_max_concurrent_pairs")]
    pub max_concurrent_pairs: usize,
    #[serde(default)]
    pub parallel_samples: bool,
}

impl Default for RawOracle {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            prompt: default_prompt(),
            max_concurrent_pairs: default_max_concurrent_pairs(),
            parallel_samples: false,
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
    #[serde(default)]
    pub scripted: RawScriptedConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            openai: RawOpenAiConfig::default(),
            scripted: RawScriptedConfig::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
            max_tokens: default_openai_max_tokens(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawScriptedConfig {
    #[serde(default = "default_scripted_answers")]
    pub answers: Vec<String>,
}

impl Default for RawScriptedConfig {
    fn default() -> Self {
        Self { answers: default_scripted_answers() }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_log_level() -> String { "info".to_string() }

pub(super) fn default_base_kg_file() -> String { "data/base-kg/base-kg-v1.jsonl".to_string() }
pub(super) fn default_recall_input_kg_file() -> String {
    "data/extracted-kg/causenet-full-linked-v1.jsonl".to_string()
}
pub(super) fn default_recall_output_file() -> String { "results/recall-v1.csv".to_string() }
pub(super) fn default_recall_output_md() -> String { "results/recall-v1.md".to_string() }
pub(super) fn default_precision_output_file() -> String { "results/precision-v1.csv".to_string() }
pub(super) fn default_precision_output_md() -> String { "results/precision-v1.md".to_string() }

pub(super) fn default_samples() -> usize { 5 }
pub(super) fn default_prompt() -> String { "instruction".to_string() }
pub(super) fn default_max_concurrent_pairs() -> usize { 1 }

pub(super) fn default_llm_provider() -> String { "dummy".to_string() }
pub(super) fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
pub(super) fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
pub(super) fn default_openai_temperature() -> f32 { 0.7 }
pub(super) fn default_openai_timeout_seconds() -> u64 { 60 }
pub(super) fn default_openai_max_tokens() -> u32 { 5 }
pub(super) fn default_scripted_answers() -> Vec<String> { vec!["yes".to_string()] }
