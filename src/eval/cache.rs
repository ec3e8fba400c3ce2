//! Memoized oracle verdicts.
//!
//! Each key owns an async `OnceCell`. The first caller to reach an empty cell
//! runs the validation; callers arriving while it is in flight wait on the
//! same cell and receive its result. A failed validation leaves the cell
//! empty, so the error propagates to that caller without caching a verdict.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::kg::Pair;

#[derive(Debug, Default)]
pub struct VerdictCache {
    slots: Mutex<HashMap<Pair, Arc<OnceCell<bool>>>>,
}

impl VerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached verdict for `pair`, running `validate` only if no
    /// verdict exists and no other caller is already computing one.
    pub async fn get_or_validate<F, Fut, E>(&self, pair: &Pair, validate: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let cell = {
            let mut slots = self.slots.lock().await;
            slots.entry(pair.clone()).or_default().clone()
        };
        cell.get_or_try_init(validate).await.copied()
    }

    /// Verdict for `pair` if it has already been settled.
    pub async fn get(&self, pair: &Pair) -> Option<bool> {
        let slots = self.slots.lock().await;
        slots.get(pair).and_then(|cell| cell.get().copied())
    }

    /// Number of settled verdicts.
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|cell| cell.initialized()).count()
    }
}
