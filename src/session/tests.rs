use super::*;
use crate::answer::NO_DOCUMENTS_RESPONSE;
use crate::store::SearchResult;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

const VOCABULARY: [&str; 6] = ["rust", "python", "cargo", "pip", "memory", "garbage"];

#[derive(Default)]
struct MapExtractor {
    files: HashMap<PathBuf, String>,
}

impl MapExtractor {
    fn with(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }
}

impl TextExtractor for MapExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        crate::extraction::DocumentFormat::from_path(path)?;
        self.files.get(path).cloned().ok_or_else(|| {
            QaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        })
    }
}

/// Counts vocabulary words, giving texts about the same topic similar vectors
#[derive(Default)]
struct KeywordEmbedder {
    fail: Cell<bool>,
    drop_last: Cell<bool>,
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail.get() {
            return Err(QaError::CollaboratorFailure("rate limited".to_string()));
        }
        let lower = text.to_lowercase();
        Ok(VOCABULARY
            .iter()
            .map(|word| {
                lower
                    .split_whitespace()
                    .filter(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == *word)
                    .count() as f32
            })
            .collect())
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = texts.iter().map(|t| self.embed(t)).collect::<Result<Vec<_>>>()?;
        if self.drop_last.get() {
            vectors.pop();
        }
        Ok(vectors)
    }
}

#[derive(Default)]
struct RecordingGenerator {
    calls: RefCell<Vec<(String, Vec<SearchResult>)>>,
}

impl AnswerGenerator for RecordingGenerator {
    fn generate_answer(&self, question: &str, context: &[SearchResult]) -> Result<String> {
        self.calls
            .borrow_mut()
            .push((question.to_string(), context.to_vec()));
        Ok(format!("answer from {}", context[0].metadata.document))
    }
}

fn small_options() -> SessionOptions {
    SessionOptions {
        chunking: ChunkingConfig::new(4, 1).expect("valid chunking"),
        top_k: 2,
    }
}

fn extractor() -> MapExtractor {
    MapExtractor::default()
        .with(
            "/docs/rust.txt",
            "Rust uses cargo and ownership instead of garbage collection for memory",
        )
        .with(
            "/docs/python.txt",
            "Python uses pip and a garbage collector to manage memory",
        )
        .with("/docs/empty.txt", "   \n\n  ")
}

#[test]
fn ask_before_adding_returns_sentinel_without_generating() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    let answer = session.ask("what is rust?").expect("should answer");
    assert_eq!(answer, NO_DOCUMENTS_RESPONSE);
    assert!(generator.calls.borrow().is_empty());
}

#[test]
fn add_and_ask() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    let rust_chunks = session
        .add_document(Path::new("/docs/rust.txt"), "rust.txt")
        .expect("should add rust doc");
    let python_chunks = session
        .add_document(Path::new("/docs/python.txt"), "python.txt")
        .expect("should add python doc");

    assert_eq!(rust_chunks, 4);
    assert_eq!(python_chunks, 3);
    assert_eq!(session.chunk_count(), 7);
    assert_eq!(session.documents(), vec!["rust.txt", "python.txt"]);

    let answer = session
        .ask_with_sources("How does pip work in python?")
        .expect("should answer");

    assert_eq!(answer.text, "answer from python.txt");
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(answer.sources[0].chunk.text, "Python uses pip and");
    assert_eq!(answer.sources[0].metadata.document, "python.txt");
    assert!((answer.sources[0].score - 1.0).abs() < 1e-6);
    // Every other chunk scores zero, so the earliest stored one fills the last slot
    assert_eq!(answer.sources[1].chunk.text, "Rust uses cargo and");
    assert_eq!(answer.sources[1].score, 0.0);

    let calls = generator.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "How does pip work in python?");
    assert_eq!(calls[0].1, answer.sources);
}

#[test]
fn empty_document_stores_nothing() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    let count = session
        .add_document(Path::new("/docs/empty.txt"), "empty.txt")
        .expect("should accept empty doc");
    assert_eq!(count, 0);
    assert!(session.documents().is_empty());
    assert_eq!(session.ask("anything").expect("should answer"), NO_DOCUMENTS_RESPONSE);
}

#[test]
fn unsupported_format_surfaces_unchanged() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    let result = session.add_document(Path::new("/docs/slides.pptx"), "slides.pptx");
    assert!(matches!(result, Err(QaError::UnsupportedFormat(_))));
    assert_eq!(session.chunk_count(), 0);
}

#[test]
fn embedding_failure_leaves_store_untouched() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    session
        .add_document(Path::new("/docs/rust.txt"), "rust.txt")
        .expect("should add rust doc");

    embedder.fail.set(true);
    let result = session.add_document(Path::new("/docs/python.txt"), "python.txt");
    assert!(matches!(result, Err(QaError::CollaboratorFailure(_))));
    assert_eq!(session.documents(), vec!["rust.txt"]);

    let result = session.ask("rust?");
    assert!(matches!(result, Err(QaError::CollaboratorFailure(_))));
    assert!(generator.calls.borrow().is_empty());
}

#[test]
fn short_embedding_batch_is_an_arity_mismatch() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    embedder.drop_last.set(true);
    let result = session.add_document(Path::new("/docs/rust.txt"), "rust.txt");
    assert!(matches!(
        result,
        Err(QaError::ArityMismatch {
            chunks: 4,
            vectors: 3
        })
    ));
    assert_eq!(session.chunk_count(), 0);
}

#[test]
fn clear_all_forgets_documents() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();
    let mut session = Session::new(extractor(), &embedder, &generator, small_options())
        .expect("should create session");

    session
        .add_document(Path::new("/docs/rust.txt"), "rust.txt")
        .expect("should add rust doc");
    session.clear_all();

    assert_eq!(session.chunk_count(), 0);
    assert_eq!(session.ask("rust?").expect("should answer"), NO_DOCUMENTS_RESPONSE);

    session
        .ingest_text("python pip", "notes")
        .expect("should ingest text");
    assert_eq!(session.documents(), vec!["notes"]);
    assert_eq!(session.ask("pip").expect("should answer"), "answer from notes");
}

#[test]
fn invalid_options_rejected() {
    let embedder = KeywordEmbedder::default();
    let generator = RecordingGenerator::default();

    let bad_chunking = SessionOptions {
        chunking: ChunkingConfig {
            chunk_size: 10,
            overlap: 10,
        },
        top_k: 3,
    };
    assert!(matches!(
        Session::new(MapExtractor::default(), &embedder, &generator, bad_chunking),
        Err(QaError::InvalidConfiguration(_))
    ));

    let bad_top_k = SessionOptions {
        top_k: 0,
        ..SessionOptions::default()
    };
    assert!(matches!(
        Session::new(MapExtractor::default(), &embedder, &generator, bad_top_k),
        Err(QaError::InvalidConfiguration(_))
    ));
}

#[test]
fn options_from_config() {
    let mut config = Config::default();
    config.chunking.chunk_size = 120;
    config.retrieval.top_k = 7;

    let options = SessionOptions::from(&config);
    assert_eq!(options.chunking.chunk_size, 120);
    assert_eq!(options.top_k, 7);
}

#[test]
fn document_names() {
    assert_eq!(document_name_for(Path::new("/home/me/Downloads/report.pdf")), "report.pdf");
    assert_eq!(document_name_for(Path::new("notes.txt")), "notes.txt");
    assert_eq!(document_name_for(Path::new("/")), "/");
}
