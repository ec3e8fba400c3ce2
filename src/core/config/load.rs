//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies the `KG_EVAL_LOG_LEVEL` env override.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bootstrap::logger;
use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Deep-merge two TOML values.
/// Tables are merged recursively; the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, built-in defaults apply.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("KG_EVAL_LOG_LEVEL").ok();

    if let Some(path) = config_path {
        return load_from(Path::new(path), log_level_override.as_deref());
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, log_level_override.as_deref())
    } else {
        resolve(RawConfig::default(), log_level_override.as_deref())
    }
}

/// Internal loader. Accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, log_level_override: Option<&str>) -> Result<Config, AppError> {
    let mut visited = HashSet::new();
    let merged = load_raw_merged(path, &mut visited)?;
    let parsed = RawConfig::deserialize(merged)
        .map_err(|e| AppError::Config(format!("invalid config in {}: {e}", path.display())))?;
    resolve(parsed, log_level_override)
}

/// Turn the raw TOML shape into validated public types.
fn resolve(parsed: RawConfig, log_level_override: Option<&str>) -> Result<Config, AppError> {
    let log_level = log_level_override.unwrap_or(&parsed.eval.log_level).to_string();
    logger::parse_level(&log_level)?;

    let oracle = parsed.oracle;
    if oracle.samples == 0 || oracle.samples % 2 == 0 {
        return Err(AppError::Config(format!(
            "oracle.samples must be a positive odd number, got {}",
            oracle.samples
        )));
    }
    if oracle.max_concurrent_pairs == 0 {
        return Err(AppError::Config("oracle.max_concurrent_pairs must be at least 1".into()));
    }

    let llm = parsed.llm;
    if llm.provider == "scripted" && llm.scripted.answers.is_empty() {
        return Err(AppError::Config("llm.scripted.answers must not be empty".into()));
    }

    Ok(Config {
        log_level,
        recall: RecallConfig {
            base_kg_file: expand_home(&parsed.recall.base_kg_file),
            input_kg_file: expand_home(&parsed.recall.input_kg_file),
            output_file: expand_home(&parsed.recall.output_file),
            output_md: expand_home(&parsed.recall.output_md),
        },
        precision: PrecisionConfig {
            input_kg_file: expand_home(&parsed.precision.input_kg_file),
            output_file: expand_home(&parsed.precision.output_file),
            output_md: expand_home(&parsed.precision.output_md),
        },
        oracle: OracleConfig {
            samples: oracle.samples,
            prompt: parse_prompt(&oracle.prompt)?,
            max_concurrent_pairs: oracle.max_concurrent_pairs,
            parallel_samples: oracle.parallel_samples,
        },
        llm: LlmConfig {
            provider: llm.provider,
            openai: OpenAiConfig {
                api_base_url: llm.openai.api_base_url,
                model: llm.openai.model,
                temperature: llm.openai.temperature,
                timeout_seconds: llm.openai.timeout_seconds,
                max_tokens: llm.openai.max_tokens,
            },
            scripted: ScriptedConfig { answers: llm.scripted.answers },
        },
        llm_api_key: env::var("LLM_API_KEY").ok(),
    })
}

/// Map the `oracle.prompt` setting onto a template.
fn parse_prompt(value: &str) -> Result<PromptTemplate, AppError> {
    match value {
        "instruction" => Ok(PromptTemplate::Instruction),
        "question" => Ok(PromptTemplate::Question),
        custom if custom.contains("{{cause}}") && custom.contains("{{effect}}") => {
            Ok(PromptTemplate::Custom(custom.to_string()))
        }
        other => Err(AppError::Config(format!(
            "oracle.prompt must be \"instruction\", \"question\", or a template with \
             {{{{cause}}}} and {{{{effect}}}} placeholders; got {other:?}"
        ))),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
