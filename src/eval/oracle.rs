//! LLM oracle: majority-vote validation of causal label pairs.
//!
//! [`OracleService`] owns the text-generation backend for the whole run:
//! it is started once before any evaluation work, shared by reference, and
//! shut down explicitly at the end. [`Validator`] sits on top of it and turns
//! `T` free-text answers into one memoized verdict per pair.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::config::{LlmConfig, OracleConfig, PromptTemplate};
use crate::eval::cache::VerdictCache;
use crate::kg::Pair;
use crate::llm::{LlmProvider, ProviderError, providers};

// ── Service ──────────────────────────────────────────────────────────────────

/// The text-generation backend, ready to serve prompts.
///
/// Holding an `OracleService` means initialisation succeeded; consuming it
/// with [`shutdown`](Self::shutdown) ends its lifetime.
#[derive(Debug)]
pub struct OracleService {
    provider: LlmProvider,
    calls: AtomicUsize,
}

impl OracleService {
    /// Build the configured provider and probe it. Any failure here aborts
    /// the run before the first query.
    pub async fn start(config: &LlmConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let provider = providers::build(config, api_key)?;
        provider.ping().await?;
        info!(provider = provider.name(), "oracle ready");
        Ok(Self::with_provider(provider))
    }

    /// Wrap an already-built provider.
    pub fn with_provider(provider: LlmProvider) -> Self {
        Self { provider, calls: AtomicUsize::new(0) }
    }

    /// One generation call. No caching and no retry.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.provider.complete(prompt).await
    }

    /// Generation calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// End the service, returning the total number of calls made.
    pub fn shutdown(self) -> usize {
        let calls = self.calls();
        info!(provider = self.provider.name(), calls, "oracle shut down");
        calls
    }
}

// ── Voting ───────────────────────────────────────────────────────────────────

/// An answer counts as "yes" when it starts with "yes", ignoring case and
/// surrounding whitespace. Everything else, including empty output, is "no".
pub fn is_yes(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with("yes")
}

/// Strict majority: at least `samples / 2 + 1` yes votes.
pub fn is_majority(yes_count: usize, samples: usize) -> bool {
    yes_count >= samples / 2 + 1
}

// ── Validator ────────────────────────────────────────────────────────────────

/// Validates label pairs against an [`OracleService`], at most once per pair.
pub struct Validator<'a> {
    oracle: &'a OracleService,
    samples: usize,
    prompt: PromptTemplate,
    parallel_samples: bool,
    cache: VerdictCache,
}

impl<'a> Validator<'a> {
    pub fn new(oracle: &'a OracleService, config: &OracleConfig) -> Self {
        Self {
            oracle,
            samples: config.samples,
            prompt: config.prompt.clone(),
            parallel_samples: config.parallel_samples,
            cache: VerdictCache::new(),
        }
    }

    /// Whether `cause → effect` plausibly holds, by majority vote.
    /// A pair seen before in this run is answered from the cache.
    pub async fn validate(&self, pair: &Pair) -> Result<bool, ProviderError> {
        self.cache.get_or_validate(pair, || self.vote(pair)).await
    }

    pub fn cache(&self) -> &VerdictCache {
        &self.cache
    }

    async fn vote(&self, pair: &Pair) -> Result<bool, ProviderError> {
        let prompt = self.prompt.render(&pair.source, &pair.target);

        let answers = if self.parallel_samples {
            try_join_all((0..self.samples).map(|_| self.oracle.generate(&prompt))).await?
        } else {
            let mut answers = Vec::with_capacity(self.samples);
            for _ in 0..self.samples {
                answers.push(self.oracle.generate(&prompt).await?);
            }
            answers
        };

        let yes_count = answers.iter().filter(|a| is_yes(a)).count();
        let verdict = is_majority(yes_count, self.samples);
        debug!(%prompt, ?answers, "oracle answers");
        debug!(pair = %pair, yes_count, samples = self.samples, verdict, "pair validated");
        Ok(verdict)
    }
}
