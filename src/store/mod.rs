
pub mod retriever;

pub use retriever::{DEFAULT_TOP_K, Retriever};

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::embeddings::chunking::Chunk;
use crate::{QaError, Result};

/// Metadata attached to every stored chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    pub document: String,
}

/// A chunk together with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// A stored chunk ranked against a query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
    pub metadata: RecordMetadata,
}

/// In-memory store answering cosine similarity queries by a full scan.
///
/// Records keep their insertion order, which is also the tie-break order
/// when two records score the same against a query.
#[derive(Debug, Default)]
pub struct VectorStore {
    records: Vec<VectorRecord>,
    dimension: Option<usize>,
    fixed_dimension: Option<usize>,
}

struct Ranked {
    index: usize,
    score: f64,
}

impl VectorStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that only accepts vectors of `dimension` entries
    #[inline]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            records: Vec::new(),
            dimension: Some(dimension),
            fixed_dimension: Some(dimension),
        }
    }

    /// Append one record per chunk/vector pair, tagged with `document_name`.
    ///
    /// All inputs are validated before the first record is appended.
    #[inline]
    pub fn add(&mut self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>, document_name: &str) -> Result<()> {
        if chunks.len() != vectors.len() {
            return Err(QaError::ArityMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        if let Some(index) = vectors.iter().position(|v| !is_finite(v)) {
            return Err(QaError::NonFiniteVector { index });
        }

        let Some(expected) = self.dimension.or_else(|| vectors.first().map(Vec::len)) else {
            return Ok(());
        };

        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(QaError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        self.dimension = Some(expected);
        self.records.reserve(chunks.len());
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            self.records.push(VectorRecord {
                chunk,
                vector,
                metadata: RecordMetadata {
                    document: document_name.to_string(),
                },
            });
        }

        info!(
            "Stored chunks for '{}' ({} records total)",
            document_name,
            self.records.len()
        );
        Ok(())
    }

    /// Rank every record against `query` and return the best `top_k`.
    #[inline]
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let Some(dimension) = self.dimension.filter(|_| !self.records.is_empty()) else {
            return Ok(Vec::new());
        };

        if query.len() != dimension {
            return Err(QaError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }
        if !is_finite(query) {
            return Err(QaError::NonFiniteQuery);
        }

        let limit = top_k.min(self.records.len());
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut best: Vec<Ranked> = Vec::with_capacity(limit);

        for (index, record) in self.records.iter().enumerate() {
            let score = cosine_similarity(query, &record.vector);

            // Equal scores stay behind earlier records since indices only grow
            let position = best.partition_point(|r| r.score.total_cmp(&score).is_ge());
            if position < limit {
                if best.len() == limit {
                    best.pop();
                }
                best.insert(position, Ranked { index, score });
            }
        }

        debug!(
            "Ranked {} records, returning {} results",
            self.records.len(),
            best.len()
        );

        Ok(best
            .into_iter()
            .map(|ranked| {
                let record = &self.records[ranked.index];
                SearchResult {
                    chunk: record.chunk.clone(),
                    score: ranked.score as f32,
                    metadata: record.metadata.clone(),
                }
            })
            .collect())
    }

    /// Remove every record
    #[inline]
    pub fn clear(&mut self) {
        info!("Clearing {} records from vector store", self.records.len());
        self.records.clear();
        self.dimension = self.fixed_dimension;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dimension shared by every stored vector, once known
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[inline]
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// Distinct document names in the order they were first added
    #[inline]
    pub fn documents(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.metadata.document.as_str())
            .unique()
            .collect()
    }
}

fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

/// Cosine of the angle between `a` and `b`, or 0 when either has zero norm
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot = x.mul_add(y, dot);
        norm_a = x.mul_add(x, norm_a);
        norm_b = y.mul_add(y, norm_b);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
