use anyhow::Result;
use clap::{Parser, Subcommand};
use docs_qa::commands::{ask_once, run_chat};
use docs_qa::config::{resolve_config_dir, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docs-qa")]
#[command(about = "Ask questions about your PDF, DOCX and text documents using a local Ollama")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.docs-qa)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Interactively add documents and ask questions (the default)
    Chat,
    /// Answer one question about the given documents
    Ask {
        /// Question to answer
        #[arg(long, short)]
        question: String,
        /// Documents to load before answering
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Chat => {
            run_chat(&config_dir)?;
        }
        Commands::Ask { question, files } => {
            ask_once(&config_dir, &files, &question)?;
        }
    }

    Ok(())
}
