//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the file given with `-f`), then applies `KG_EVAL_LOG_LEVEL`.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs consumed by the pipelines
//!   (`Config`, `OracleConfig`, `LlmConfig`, etc.).
//! - **raw**: Raw TOML deserialization types (`RawConfig`, `RawLlm`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load**: Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::*;

impl Config {
    /// `Config` for tests: scripted LLM, no API keys, no external calls.
    pub fn test_default(work_dir: &std::path::Path, answers: &[&str]) -> Self {
        Self {
            log_level: "info".into(),
            recall: RecallConfig {
                base_kg_file: work_dir.join("base.jsonl"),
                input_kg_file: work_dir.join("input.jsonl"),
                output_file: work_dir.join("recall.csv"),
                output_md: work_dir.join("recall.md"),
            },
            precision: PrecisionConfig {
                input_kg_file: work_dir.join("input.jsonl"),
                output_file: work_dir.join("precision.csv"),
                output_md: work_dir.join("precision.md"),
            },
            oracle: OracleConfig {
                samples: raw::default_samples(),
                prompt: PromptTemplate::Instruction,
                max_concurrent_pairs: 1,
                parallel_samples: false,
            },
            llm: LlmConfig {
                provider: "scripted".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                    max_tokens: 5,
                },
                scripted: ScriptedConfig {
                    answers: answers.iter().map(|a| a.to_string()).collect(),
                },
            },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[eval]
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_minimal_config_uses_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.oracle.samples, 5);
        assert_eq!(cfg.oracle.prompt, PromptTemplate::Instruction);
        assert_eq!(cfg.oracle.max_concurrent_pairs, 1);
        assert!(!cfg.oracle.parallel_samples);
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.recall.base_kg_file, PathBuf::from("data/base-kg/base-kg-v1.jsonl"));
        assert_eq!(cfg.precision.output_file, PathBuf::from("results/precision-v1.csv"));
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[eval]
log_level = "debug"

[recall]
base_kg_file = "/data/base.jsonl"
input_kg_file = "/data/input.jsonl"
output_file = "/out/recall.csv"
output_md = "/out/recall.md"

[oracle]
samples = 3
prompt = "question"
max_concurrent_pairs = 8
parallel_samples = true

[llm]
default = "scripted"

[llm.scripted]
answers = ["yes", "no"]
"#;
        let f = write_toml(toml);
        let cfg = load_from(f.path(), None).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.recall.base_kg_file, PathBuf::from("/data/base.jsonl"));
        assert_eq!(cfg.recall.output_md, PathBuf::from("/out/recall.md"));
        assert_eq!(cfg.oracle.samples, 3);
        assert_eq!(cfg.oracle.prompt, PromptTemplate::Question);
        assert_eq!(cfg.oracle.max_concurrent_pairs, 8);
        assert!(cfg.oracle.parallel_samples);
        assert_eq!(cfg.llm.provider, "scripted");
        assert_eq!(cfg.llm.scripted.answers, vec!["yes", "no"]);
    }

    #[test]
    fn even_sample_count_is_rejected() {
        let f = write_toml("[oracle]\nsamples = 4\n");
        let err = load_from(f.path(), None).unwrap_err();
        assert!(err.to_string().contains("odd"));
    }

    #[test]
    fn zero_sample_count_is_rejected() {
        let f = write_toml("[oracle]\nsamples = 0\n");
        assert!(load_from(f.path(), None).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let f = write_toml("[oracle]\nmax_concurrent_pairs = 0\n");
        assert!(load_from(f.path(), None).is_err());
    }

    #[test]
    fn empty_scripted_answers_are_rejected() {
        let f = write_toml("[llm]\ndefault = \"scripted\"\n[llm.scripted]\nanswers = []\n");
        assert!(load_from(f.path(), None).is_err());
    }

    #[test]
    fn custom_prompt_needs_both_placeholders() {
        let ok = write_toml("[oracle]\nprompt = \"Is {{effect}} caused by {{cause}}?\"\n");
        let cfg = load_from(ok.path(), None).unwrap();
        assert_eq!(
            cfg.oracle.prompt.render("rain", "flood"),
            "Is flood caused by rain?"
        );

        let bad = write_toml("[oracle]\nprompt = \"Is {{cause}} bad?\"\n");
        let err = load_from(bad.path(), None).unwrap_err();
        assert!(err.to_string().contains("oracle.prompt"));
    }

    #[test]
    fn custom_prompt_does_not_expand_placeholders_inside_labels() {
        let template = PromptTemplate::Custom("Does {{cause}} lead to {{effect}}?".into());
        assert_eq!(
            template.render("a {{effect}} b", "c {{cause}} d"),
            "Does a {{effect}} b lead to c {{cause}} d?"
        );
        let braces = PromptTemplate::Custom("{{{cause}}} -> {{effect}} {{other}}".into());
        assert_eq!(braces.render("x", "y"), "{x} -> y {{other}}");
    }

    #[test]
    fn builtin_prompts_mention_both_labels() {
        for template in [PromptTemplate::Instruction, PromptTemplate::Question] {
            let prompt = template.render("earthquake", "tsunami");
            assert!(prompt.contains("earthquake"));
            assert!(prompt.contains("tsunami"));
            assert!(prompt.contains("yes or no"));
        }
        assert_eq!(
            PromptTemplate::Instruction.render("a", "b"),
            "Definition: Answer the question with yes or no. Now complete the following \
             example - Input: Question: Could a result in b? Output:"
        );
    }

    #[test]
    fn log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("trace")).unwrap();
        assert_eq!(cfg.log_level, "trace");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let f = write_toml("[eval]\nlog_level = \"verbsoe\"\n");
        let err = load_from(f.path(), None).unwrap_err();
        assert!(err.to_string().contains("verbsoe"));
    }

    #[test]
    fn unknown_log_level_override_is_rejected() {
        let f = write_toml(MINIMAL_TOML);
        assert!(load_from(f.path(), Some("loud")).is_err());
    }

    #[test]
    fn base_chain_merges_overlay() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[oracle]\nsamples = 7\nprompt = \"question\"\n",
        )
        .unwrap();
        let overlay = dir.path().join("overlay.toml");
        std::fs::write(&overlay, "[meta]\nbase = \"base.toml\"\n\n[oracle]\nsamples = 3\n").unwrap();

        let cfg = load_from(&overlay, None).unwrap();
        assert_eq!(cfg.oracle.samples, 3);
        assert_eq!(cfg.oracle.prompt, PromptTemplate::Question);
    }

    #[test]
    fn circular_base_is_detected() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.toml");
        std::fs::write(&a, "[meta]\nbase = \"b.toml\"\n").unwrap();
        std::fs::write(dir.path().join("b.toml"), "[meta]\nbase = \"a.toml\"\n").unwrap();
        let err = load_from(&a, None).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/results/recall.csv");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("results/recall.csv"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("data/kg.jsonl"), PathBuf::from("data/kg.jsonl"));
    }
}
