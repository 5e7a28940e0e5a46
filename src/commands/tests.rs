use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn find_documents_filters_and_sorts() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("nested/deeper")).expect("should create nested dirs");

    fs::write(root.join("b.txt"), "hello").expect("should write b.txt");
    fs::write(root.join("A.PDF"), "%PDF").expect("should write A.PDF");
    fs::write(root.join("nested/report.docx"), "zip").expect("should write report.docx");
    fs::write(root.join("nested/deeper/notes.txt"), "x".repeat(2048))
        .expect("should write notes.txt");
    fs::write(root.join("image.png"), "png").expect("should write image.png");
    fs::write(root.join("nested/slides.pptx"), "pptx").expect("should write slides.pptx");

    let files = find_documents(root);
    let names: Vec<String> = files.iter().map(DocumentFile::name).collect();
    assert_eq!(names, vec!["A.PDF", "b.txt", "notes.txt", "report.docx"]);

    let notes = files
        .iter()
        .find(|f| f.name() == "notes.txt")
        .expect("notes.txt should be listed");
    assert_eq!(notes.size_bytes, 2048);
    assert!((notes.size_kb() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn find_documents_in_missing_directory_is_empty() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let files = find_documents(&temp_dir.path().join("does-not-exist"));
    assert!(files.is_empty());
}

#[test]
fn directories_with_document_extensions_are_skipped() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::create_dir_all(temp_dir.path().join("archive.txt")).expect("should create dir");

    assert!(find_documents(temp_dir.path()).is_empty());
}

#[test]
fn file_descriptions_show_size_in_kb() {
    let file = DocumentFile {
        path: PathBuf::from("/home/me/Downloads/paper.pdf"),
        size_bytes: 1536,
    };
    assert_eq!(describe_file(&file), "paper.pdf (1.5 KB)");
}
