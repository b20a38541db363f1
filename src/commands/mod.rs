// CLI command implementations
// Indexing, one-shot questions and the interactive chat session

pub mod session;


use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::RagError;
use crate::completion::OpenAiChatClient;
use crate::config::Config;
use crate::database::VectorStore;
use crate::embeddings::{Embedder, OpenAiEmbeddingClient};
use crate::indexer::{BatchReport, FileProgress, Indexer, UploadedFile};

pub use session::{Answer, ChatCommand, ChatSession};

/// Read files from disk, collecting unreadable ones as failures
#[inline]
pub fn read_files(paths: &[PathBuf]) -> (Vec<UploadedFile>, Vec<(String, RagError)>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut failed = Vec::new();

    for path in paths {
        match UploadedFile::read(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                failed.push((path.display().to_string(), e));
            }
        }
    }

    (files, failed)
}

/// Read and index `paths` into `store`; unreadable files are reported as failures
#[inline]
pub fn index_paths<E: Embedder>(
    indexer: &Indexer<E>,
    store: &mut VectorStore,
    paths: &[PathBuf],
) -> Result<BatchReport> {
    add_paths(paths, |files, on_progress| {
        indexer.index_batch_with_progress(store, files, on_progress)
    })
}

/// Index files into a fresh store and report per-file chunk counts
#[inline]
pub fn index_files(config: &Config, paths: &[PathBuf]) -> Result<()> {
    config.validate()?;
    let embedder = OpenAiEmbeddingClient::new(&config.provider)
        .context("Failed to initialize embedding client")?;
    let indexer = Indexer::from_config(&embedder, config)?;
    let mut store = VectorStore::new(config.provider.embedding_dimension);

    let report = index_paths(&indexer, &mut store, paths)?;
    print_report(&report);

    eprintln!(
        "Indexed {} chunks from {} file(s)",
        style(store.count()).cyan(),
        report.indexed.len()
    );

    if report.indexed.is_empty() && !paths.is_empty() {
        anyhow::bail!("No files could be indexed");
    }
    Ok(())
}

/// Index `paths`, then answer a single question
#[inline]
pub fn ask_question(config: &Config, paths: &[PathBuf], question: &str) -> Result<()> {
    let embedder = OpenAiEmbeddingClient::new(&config.provider)
        .context("Failed to initialize embedding client")?;
    let completer = OpenAiChatClient::new(&config.provider)
        .context("Failed to initialize completion client")?;
    let mut session = ChatSession::from_config(&embedder, &completer, config)?;

    let report = add_session_paths(&mut session, paths)?;
    if report.has_failures() {
        print_report(&report);
    }

    let answer = session
        .ask(question)
        .context("Failed to answer question")?;
    print_answer(&answer);
    Ok(())
}

/// Index `paths`, then read questions and slash commands until `/quit`
#[inline]
pub fn run_chat(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let embedder = OpenAiEmbeddingClient::new(&config.provider)
        .context("Failed to initialize embedding client")?;
    let completer = OpenAiChatClient::new(&config.provider)
        .context("Failed to initialize completion client")?;
    let mut session = ChatSession::from_config(&embedder, &completer, config)?;

    eprintln!("{}", style("📄 PDF RAG Chat").bold().cyan());
    if !paths.is_empty() {
        let report = add_session_paths(&mut session, paths)?;
        print_report(&report);
    }
    print_help();

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => print_help(),
            ChatCommand::Add(path) => {
                let report = add_session_paths(&mut session, &[path])?;
                print_report(&report);
            }
            ChatCommand::Files => print_files(&session),
            ChatCommand::Clear => {
                let removed = session.clear_documents();
                eprintln!("Cleared {} chunks from the store", removed);
            }
            ChatCommand::New => {
                session.new_conversation();
                eprintln!("Started a new conversation");
            }
            ChatCommand::Unknown(command) => {
                eprintln!(
                    "{} Unknown command: {}",
                    style("⚠").yellow(),
                    command
                );
            }
            ChatCommand::Ask(question) => match session.ask(&question) {
                Ok(answer) => print_answer(&answer),
                // The session stays usable after a failed question
                Err(e) => eprintln!("{} {}", style("❌ Error:").red(), e),
            },
        }
    }

    info!(
        "Chat ended after {} exchanges",
        session.history().len()
    );
    Ok(())
}

fn add_session_paths<E, C>(
    session: &mut ChatSession<'_, E, C>,
    paths: &[PathBuf],
) -> Result<BatchReport>
where
    E: Embedder,
    C: crate::completion::Completer,
{
    add_paths(paths, |files, on_progress| {
        session.add_files(files, on_progress)
    })
}

/// Read `paths` and hand the readable files to `index`, showing a progress bar on a terminal
fn add_paths<F>(paths: &[PathBuf], index: F) -> Result<BatchReport>
where
    F: FnOnce(&[UploadedFile], &mut dyn FnMut(FileProgress<'_>)) -> BatchReport,
{
    let (files, unreadable) = read_files(paths);

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(files.len() as u64).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Indexing {msg}")
                .context("Invalid progress template")?,
        )
    } else {
        ProgressBar::hidden()
    };

    let mut report = index(&files, &mut |progress: FileProgress<'_>| {
        bar.set_message(progress.filename.to_string());
        bar.set_position(progress.position as u64);
    });
    bar.finish_and_clear();

    report.failed.extend(unreadable);
    Ok(report)
}

fn print_report(report: &BatchReport) {
    for (filename, chunks) in &report.indexed {
        eprintln!(
            "{} {}: {} chunks",
            style("✓").green(),
            filename,
            chunks
        );
    }
    for (filename, error) in &report.failed {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            filename,
            error.root()
        );
    }
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        eprintln!();
        eprintln!("{}", style("Sources:").dim());
        for source in &answer.sources {
            eprintln!(
                "  {} chunk {} ({:.3})",
                source.metadata.source,
                source.metadata.chunk,
                source.score
            );
        }
    }
}

fn print_files<E, C>(session: &ChatSession<'_, E, C>)
where
    E: Embedder,
    C: crate::completion::Completer,
{
    let files = session.files();
    if files.is_empty() {
        eprintln!("No documents have been indexed yet.");
        return;
    }

    eprintln!("{}", style("Indexed files:").bold());
    for file in &files {
        eprintln!("  📄 {}", file);
    }
    eprintln!("Total chunks: {}", session.chunk_count());
}

fn print_help() {
    eprintln!("Ask a question, or use one of:");
    eprintln!("  /add <path>  index another PDF");
    eprintln!("  /files       list indexed files");
    eprintln!("  /clear       remove all indexed documents");
    eprintln!("  /new         start a new conversation");
    eprintln!("  /quit        exit");
}

/// Resolve the configuration directory from an explicit override or the platform default
#[inline]
pub fn resolve_config_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => crate::config::get_config_dir().context("Failed to determine config directory"),
    }
}
