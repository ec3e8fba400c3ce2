//! Scripted provider: replays a fixed list of answers in order, wrapping
//! around at the end. Selected with `llm.default = "scripted"` for dry runs
//! and used by the test suites to drive exact vote sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::ProviderError;

/// Clones share the same cursor, so a clone observes every call made
/// through any other clone.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    answers: Arc<[String]>,
    cursor: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(answers: Vec<String>) -> Result<Self, ProviderError> {
        if answers.is_empty() {
            return Err(ProviderError::Request("scripted provider needs at least one answer".into()));
        }
        Ok(Self {
            answers: answers.into(),
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        let n = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers[n % self.answers.len()].clone())
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(answers: &[&str]) -> ScriptedProvider {
        ScriptedProvider::new(answers.iter().map(|a| a.to_string()).collect()).unwrap()
    }

    #[tokio::test]
    async fn replays_in_order_and_wraps() {
        let p = scripted(&["yes", "no"]);
        assert_eq!(p.complete("q").await.unwrap(), "yes");
        assert_eq!(p.complete("q").await.unwrap(), "no");
        assert_eq!(p.complete("q").await.unwrap(), "yes");
        assert_eq!(p.calls(), 3);
    }

    #[tokio::test]
    async fn clones_share_the_cursor() {
        let p = scripted(&["yes"]);
        let clone = p.clone();
        clone.complete("q").await.unwrap();
        assert_eq!(p.calls(), 1);
    }

    #[test]
    fn empty_script_is_rejected() {
        assert!(ScriptedProvider::new(Vec::new()).is_err());
    }
}
