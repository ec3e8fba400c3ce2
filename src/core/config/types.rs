//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that the pipelines consume.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── Pipelines ────────────────────────────────────────────────────────────────

/// Inputs and outputs of the recall pipeline (`[recall]`).
#[derive(Debug, Clone)]
pub struct RecallConfig {
    /// Curated ground-truth KG used as the recall denominator.
    pub base_kg_file: PathBuf,
    /// Automatically constructed KG under evaluation.
    pub input_kg_file: PathBuf,
    pub output_file: PathBuf,
    pub output_md: PathBuf,
}

/// Inputs and outputs of the precision pipeline (`[precision]`).
#[derive(Debug, Clone)]
pub struct PrecisionConfig {
    pub input_kg_file: PathBuf,
    pub output_file: PathBuf,
    pub output_md: PathBuf,
}

// ── Oracle ───────────────────────────────────────────────────────────────────

/// Prompt wording sent to the oracle for each sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Instruction-tuned phrasing: "Could {cause} result in {effect}?"
    Instruction,
    /// Plain question phrasing: "Does {cause} cause {effect}?"
    Question,
    /// User template with `{{cause}}` and `{{effect}}` placeholders.
    Custom(String),
}

impl PromptTemplate {
    /// Render the prompt for one cause/effect label pair.
    pub fn render(&self, cause: &str, effect: &str) -> String {
        match self {
            PromptTemplate::Instruction => format!(
                "Definition: Answer the question with yes or no. \
                 Now complete the following example - \
                 Input: Question: Could {cause} result in {effect}? Output:"
            ),
            PromptTemplate::Question => format!(
                "Answer the question with yes or no.\nQuestion: Does {cause} cause {effect}? Answer:"
            ),
            PromptTemplate::Custom(text) => fill_placeholders(text, cause, effect),
        }
    }
}

/// Substitute `{{cause}}` and `{{effect}}` in one left-to-right pass, so
/// placeholder text inside a label is left as is.
fn fill_placeholders(template: &str, cause: &str, effect: &str) -> String {
    let mut out = String::with_capacity(template.len() + cause.len() + effect.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{{cause}}") {
            out.push_str(cause);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{{effect}}") {
            out.push_str(effect);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Oracle validation settings (`[oracle]`).
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Queries per pair. Always odd, so a strict majority exists.
    pub samples: usize,
    pub prompt: PromptTemplate,
    /// Upper bound on distinct pairs validated at the same time.
    pub max_concurrent_pairs: usize,
    /// Issue the samples of one pair concurrently instead of one after another.
    pub parallel_samples: bool,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Cap on generated tokens; a yes/no answer needs very few.
    pub max_tokens: u32,
}

/// Scripted provider configuration (`[llm.scripted]`).
#[derive(Debug, Clone)]
pub struct ScriptedConfig {
    /// Answers replayed in order, wrapping around.
    pub answers: Vec<String>,
}

/// Text-generation backend configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"scripted"`, `"openai"`).
    pub provider: String,
    pub openai: OpenAiConfig,
    pub scripted: ScriptedConfig,
}

// ── Root ─────────────────────────────────────────────────────────────────────

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub recall: RecallConfig,
    pub precision: PrecisionConfig,
    pub oracle: OracleConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var. `None` for keyless local models.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}
