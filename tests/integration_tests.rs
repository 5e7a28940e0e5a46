#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

//! End-to-end tests of a session reading real files from disk.
//!
//! Embeddings come from a bag-of-letters embedder and answers echo the best
//! source, so no Ollama instance is needed.

use docs_qa::answer::{AnswerGenerator, NO_DOCUMENTS_RESPONSE};
use docs_qa::embeddings::{ChunkingConfig, Embedder};
use docs_qa::extraction::FileExtractor;
use docs_qa::session::{Session, SessionOptions, document_name_for};
use docs_qa::store::SearchResult;
use docs_qa::{QaError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut counts = vec![0.0_f32; 26];
        for byte in text.to_ascii_lowercase().bytes() {
            if byte.is_ascii_lowercase() {
                counts[usize::from(byte - b'a')] += 1.0;
            }
        }
        Ok(counts)
    }
}

struct EchoGenerator;

impl AnswerGenerator for EchoGenerator {
    fn generate_answer(&self, _question: &str, context: &[SearchResult]) -> Result<String> {
        Ok(context
            .first()
            .map(|best| best.chunk.text.clone())
            .unwrap_or_default())
    }
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let file = File::create(path).expect("should create docx file");
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::FileOptions::default())
        .expect("should start document.xml");
    zip.write_all(xml.as_bytes())
        .expect("should write document.xml");
    zip.finish().expect("should finish docx archive");
}

fn fixture_dir() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let txt = temp_dir.path().join("zebras.txt");
    fs::write(&txt, "zzz zebra zone\n\nzany zebras zigzag").expect("should write txt");

    let docx = temp_dir.path().join("apples.docx");
    write_docx(&docx, &["apple pie", "a happy apple &amp; papaya"]);

    (temp_dir, txt, docx)
}

fn session() -> Session<FileExtractor, LetterEmbedder, EchoGenerator> {
    let options = SessionOptions {
        chunking: ChunkingConfig::new(3, 0).expect("valid chunking"),
        top_k: 1,
    };
    Session::new(FileExtractor, LetterEmbedder, EchoGenerator, options)
        .expect("should create session")
}

#[test]
fn answers_come_from_the_closest_document() {
    let (_temp_dir, txt, docx) = fixture_dir();
    let mut session = session();

    assert_eq!(session.ask("anything").expect("should answer"), NO_DOCUMENTS_RESPONSE);

    let txt_chunks = session
        .add_document(&txt, &document_name_for(&txt))
        .expect("should add txt");
    let docx_chunks = session
        .add_document(&docx, &document_name_for(&docx))
        .expect("should add docx");

    assert_eq!(txt_chunks, 2);
    assert_eq!(docx_chunks, 3);
    assert_eq!(session.documents(), vec!["zebras.txt", "apples.docx"]);

    let answer = session
        .ask_with_sources("zigzag zebras")
        .expect("should answer");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].metadata.document, "zebras.txt");
    assert_eq!(answer.text, "zany zebras zigzag");

    let answer = session
        .ask_with_sources("apple & papaya")
        .expect("should answer");
    assert_eq!(answer.sources[0].metadata.document, "apples.docx");
    assert_eq!(answer.text, "papaya");
}

#[test]
fn failed_additions_keep_existing_documents() {
    let (temp_dir, txt, _docx) = fixture_dir();
    let mut session = session();

    session
        .add_document(&txt, "zebras.txt")
        .expect("should add txt");

    let unsupported = temp_dir.path().join("slides.pptx");
    fs::write(&unsupported, "not really slides").expect("should write pptx");
    assert!(matches!(
        session.add_document(&unsupported, "slides.pptx"),
        Err(QaError::UnsupportedFormat(_))
    ));

    let missing = temp_dir.path().join("missing.txt");
    assert!(matches!(
        session.add_document(&missing, "missing.txt"),
        Err(QaError::Io(_))
    ));

    let broken_docx = temp_dir.path().join("broken.docx");
    fs::write(&broken_docx, "this is not a zip archive").expect("should write docx");
    assert!(session.add_document(&broken_docx, "broken.docx").is_err());

    assert_eq!(session.documents(), vec!["zebras.txt"]);
    assert_eq!(session.chunk_count(), 2);
}

#[test]
fn clearing_resets_the_session() {
    let (_temp_dir, txt, docx) = fixture_dir();
    let mut session = session();

    session.add_document(&txt, "zebras.txt").expect("should add txt");
    session.clear_all();
    assert_eq!(session.ask("zebra").expect("should answer"), NO_DOCUMENTS_RESPONSE);

    session.add_document(&docx, "apples.docx").expect("should add docx");
    assert_eq!(session.documents(), vec!["apples.docx"]);
    assert_eq!(session.ask("pie").expect("should answer"), "apple pie a");
}
