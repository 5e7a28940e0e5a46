
use tracing::debug;

use super::{SearchResult, VectorStore};
use crate::{QaError, Result};

pub const DEFAULT_TOP_K: usize = 3;

/// Top-K lookup over a borrowed vector store
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    store: &'a VectorStore,
    top_k: usize,
}

impl<'a> Retriever<'a> {
    #[inline]
    pub fn new(store: &'a VectorStore) -> Self {
        Self {
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(QaError::InvalidConfiguration(
                "top_k must be at least 1".to_string(),
            ));
        }
        self.top_k = top_k;
        Ok(self)
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Return up to `top_k` records ranked by similarity to `query`, best first
    #[inline]
    pub fn search(&self, query: &[f32]) -> Result<Vec<SearchResult>> {
        let results = self.store.search(query, self.top_k)?;
        debug!(
            "Retrieved {} of {} requested chunks",
            results.len(),
            self.top_k
        );
        Ok(results)
    }
}
