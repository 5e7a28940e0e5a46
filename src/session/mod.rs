#[cfg(test)]
mod tests;

use std::path::Path;
use tracing::{debug, info, warn};

use crate::answer::{Answer, AnswerGenerator};
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::embeddings::chunking::{ChunkingConfig, chunk_text};
use crate::extraction::TextExtractor;
use crate::store::{DEFAULT_TOP_K, Retriever, VectorStore};
use crate::{QaError, Result};

/// Tunables for a question-answering session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub chunking: ChunkingConfig,
    pub top_k: usize,
}

impl Default for SessionOptions {
    #[inline]
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl From<&Config> for SessionOptions {
    #[inline]
    fn from(config: &Config) -> Self {
        Self {
            chunking: config.chunking,
            top_k: config.retrieval.top_k,
        }
    }
}

/// One interactive session: a vector store plus the collaborators that feed it.
///
/// Adding and clearing take `&mut self` while asking takes `&self`, so a host
/// sharing a session across threads wraps it in an `RwLock`.
pub struct Session<X, E, G> {
    extractor: X,
    embedder: E,
    generator: G,
    store: VectorStore,
    options: SessionOptions,
}

impl<X, E, G> Session<X, E, G>
where
    X: TextExtractor,
    E: Embedder,
    G: AnswerGenerator,
{
    #[inline]
    pub fn new(extractor: X, embedder: E, generator: G, options: SessionOptions) -> Result<Self> {
        options.chunking.validate()?;
        if options.top_k == 0 {
            return Err(QaError::InvalidConfiguration(
                "top_k must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            extractor,
            embedder,
            generator,
            store: VectorStore::new(),
            options,
        })
    }

    /// Extract, chunk, embed and store one document, returning the number of chunks stored
    #[inline]
    pub fn add_document(&mut self, path: &Path, document_name: &str) -> Result<usize> {
        info!("Adding document {} as '{}'", path.display(), document_name);
        let text = self.extractor.extract(path)?;
        self.ingest_text(&text, document_name)
    }

    /// Chunk, embed and store already extracted text
    #[inline]
    pub fn ingest_text(&mut self, text: &str, document_name: &str) -> Result<usize> {
        let chunks = chunk_text(text, document_name, &self.options.chunking)?;
        if chunks.is_empty() {
            warn!("Document '{}' contains no words, nothing stored", document_name);
            return Ok(0);
        }

        let texts = chunks.iter().map(|c| c.text.clone()).collect::<Vec<_>>();
        debug!("Embedding {} chunks for '{}'", texts.len(), document_name);
        let vectors = self.embedder.embed_batch(&texts)?;

        let count = chunks.len();
        self.store.add(chunks, vectors, document_name)?;
        info!("Added {} chunks from '{}'", count, document_name);
        Ok(count)
    }

    /// Answer `question` from the stored documents
    #[inline]
    pub fn ask(&self, question: &str) -> Result<String> {
        self.ask_with_sources(question).map(|answer| answer.text)
    }

    /// Answer `question`, also returning the ranked chunks used as context
    #[inline]
    pub fn ask_with_sources(&self, question: &str) -> Result<Answer> {
        if self.store.is_empty() {
            debug!("Question asked before any document was added");
            return Ok(Answer::no_documents());
        }

        let query = self.embedder.embed(question)?;
        let sources = Retriever::new(&self.store)
            .with_top_k(self.options.top_k)?
            .search(&query)?;

        if sources.is_empty() {
            return Ok(Answer::no_documents());
        }

        info!("Found {} relevant chunks", sources.len());
        let text = self.generator.generate_answer(question, &sources)?;

        Ok(Answer { text, sources })
    }

    /// Forget every stored document
    #[inline]
    pub fn clear_all(&mut self) {
        self.store.clear();
    }

    /// Names of the stored documents, in the order they were added
    #[inline]
    pub fn documents(&self) -> Vec<&str> {
        self.store.documents()
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

/// Default document name for a path: its final component
#[inline]
pub fn document_name_for(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
