#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::answer::Answer;
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::extraction::{DocumentFormat, FileExtractor};
use crate::session::{Session, SessionOptions, document_name_for};

type OllamaSession<'a> = Session<FileExtractor, &'a OllamaClient, &'a OllamaClient>;

const RULE_WIDTH: usize = 60;

/// A supported document found while browsing a folder
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl DocumentFile {
    #[inline]
    pub fn name(&self) -> String {
        document_name_for(&self.path)
    }

    #[inline]
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Recursively list the supported documents under `directory`, sorted by path
#[inline]
pub fn find_documents(directory: &Path) -> Vec<DocumentFile> {
    let mut files: Vec<DocumentFile> = WalkDir::new(directory)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir() && DocumentFormat::is_supported(entry.path()))
        .map(|entry| DocumentFile {
            size_bytes: entry.metadata().map_or(0, |m| m.len()),
            path: entry.into_path(),
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    files
}

fn build_client(config: &Config) -> Result<OllamaClient> {
    let client = OllamaClient::new(&config.ollama)?;
    info!("Using Ollama at {}", client.base_url());
    Ok(client)
}

fn spinner(message: String) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn add_with_progress(session: &mut OllamaSession<'_>, path: &Path) -> Result<usize> {
    let name = document_name_for(path);
    let bar = spinner(format!("Embedding {}", name));
    let result = session.add_document(path, &name);
    bar.finish_and_clear();
    Ok(result?)
}

fn ask_with_progress(session: &OllamaSession<'_>, question: &str) -> Result<Answer> {
    let bar = spinner("Generating answer...".to_string());
    let result = session.ask_with_sources(question);
    bar.finish_and_clear();
    Ok(result?)
}

fn print_answer(answer: &Answer) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", style("💡 Answer:").bold().green());
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("{}", answer.text);

    if !answer.sources.is_empty() {
        println!("{}", "-".repeat(RULE_WIDTH));
        println!("{}", style("Sources:").bold());
        for (i, source) in answer.sources.iter().enumerate() {
            println!(
                "  {}. {} (chunk {}, score {:.3})",
                i + 1,
                source.metadata.document,
                source.chunk.ordinal,
                source.score
            );
        }
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Answer a single question about `files` and exit
#[inline]
pub fn ask_once(config_dir: &Path, files: &[PathBuf], question: &str) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let client = build_client(&config)?;
    let mut session = Session::new(
        FileExtractor,
        &client,
        &client,
        SessionOptions::from(&config),
    )?;

    for path in files {
        let count = add_with_progress(&mut session, path)
            .with_context(|| format!("Failed to add {}", path.display()))?;
        eprintln!("✓ {} ({} chunks)", document_name_for(path), count);
    }

    let answer = ask_with_progress(&session, question)?;
    print_answer(&answer);

    Ok(())
}

/// Run the interactive document question-answering loop
#[inline]
pub fn run_chat(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let client = build_client(&config)?;
    let mut session = Session::new(
        FileExtractor,
        &client,
        &client,
        SessionOptions::from(&config),
    )?;

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", style("🚀 Docs QA: ask questions about your documents").bold().cyan());
    println!("{}", "=".repeat(RULE_WIDTH));

    if let Err(e) = client.health_check() {
        warn!("Ollama health check failed: {:#}", e);
        eprintln!(
            "{}",
            style("⚠ Warning: Ollama is not reachable or a model is missing").yellow()
        );
        eprintln!("Run 'docs-qa config' to check your settings.");
    }

    let options = &[
        "Add document",
        "Ask question",
        "List documents",
        "Clear documents",
        "Exit",
    ];

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .default(0)
            .items(options)
            .interact()?;

        match choice {
            0 => {
                let Some(path) = select_file()? else {
                    continue;
                };
                if !path.is_file() {
                    eprintln!("{}", style("❌ File not found!").red());
                    continue;
                }
                match add_with_progress(&mut session, &path) {
                    Ok(0) => eprintln!(
                        "{}",
                        style("⚠ The document contains no text, nothing was added").yellow()
                    ),
                    Ok(count) => eprintln!(
                        "{}",
                        style(format!("✓ Document added ({} chunks)", count)).green()
                    ),
                    Err(e) => {
                        error!("Failed to add {}: {:#}", path.display(), e);
                        eprintln!("{} {:#}", style("❌ Error:").red(), e);
                    }
                }
            }
            1 => {
                let question: String = Input::new()
                    .with_prompt("Enter your question")
                    .allow_empty(true)
                    .interact_text()?;
                let question = question.trim();
                if question.is_empty() {
                    eprintln!("{}", style("❌ Please enter a question!").red());
                    continue;
                }
                match ask_with_progress(&session, question) {
                    Ok(answer) => print_answer(&answer),
                    Err(e) => {
                        error!("Failed to answer question: {:#}", e);
                        eprintln!("{} {:#}", style("❌ Error:").red(), e);
                    }
                }
            }
            2 => {
                let documents = session.documents();
                if documents.is_empty() {
                    println!("No documents have been added yet.");
                } else {
                    println!(
                        "Documents ({} total, {} chunks):",
                        documents.len(),
                        session.chunk_count()
                    );
                    for name in documents {
                        println!("  📄 {}", name);
                    }
                }
            }
            3 => {
                session.clear_all();
                eprintln!("{}", style("✓ All documents cleared!").green());
            }
            _ => {
                println!("👋 Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

fn select_file() -> Result<Option<PathBuf>> {
    let options = &[
        "Enter full file path",
        "Browse Downloads folder",
        "Browse Documents folder",
        "Browse current directory",
        "Search in a specific folder",
    ];

    let choice = Select::new()
        .with_prompt("File selection")
        .default(0)
        .items(options)
        .interact()?;

    let directory = match choice {
        0 => {
            let path: String = Input::new()
                .with_prompt("Enter full file path")
                .interact_text()?;
            return Ok(Some(PathBuf::from(path.trim())));
        }
        1 => dirs::download_dir(),
        2 => dirs::document_dir(),
        3 => Some(std::env::current_dir().context("Failed to read current directory")?),
        _ => {
            let folder: String = Input::new()
                .with_prompt("Enter folder path")
                .interact_text()?;
            let folder = PathBuf::from(folder.trim());
            if !folder.is_dir() {
                eprintln!("{}", style("❌ Folder not found!").red());
                return Ok(None);
            }
            Some(folder)
        }
    };

    let Some(directory) = directory else {
        eprintln!("{}", style("❌ That folder is not available on this system").red());
        return Ok(None);
    };

    browse_directory(&directory)
}

fn browse_directory(directory: &Path) -> Result<Option<PathBuf>> {
    eprintln!("📂 Searching in: {}", directory.display());
    let files = find_documents(directory);

    if files.is_empty() {
        eprintln!(
            "{}",
            style("❌ No PDF, DOCX, or TXT files found in this directory!").red()
        );
        return Ok(None);
    }

    let labels: Vec<String> = files.iter().map(describe_file).collect();
    let selection = Select::new()
        .with_prompt(format!("Found {} documents, select one", files.len()))
        .default(0)
        .items(&labels)
        .interact_opt()?;

    Ok(selection.and_then(|index| files.get(index)).map(|f| f.path.clone()))
}

fn describe_file(file: &DocumentFile) -> String {
    format!("{} ({:.1} KB)", file.name(), file.size_kb())
}
