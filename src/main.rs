use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_rag::commands::{ask_question, index_files, resolve_config_dir, run_chat};
use pdf_rag::config::{Config, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-rag")]
#[command(about = "Index PDF documents and answer questions about them")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding and completion provider
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Index PDF files and report how many chunks each produced
    Index {
        /// PDF files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Index PDF files and answer a single question
    Ask {
        /// PDF file to index; may be repeated
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
        /// Question to answer
        question: String,
    },
    /// Index PDF files and start an interactive chat
    Chat {
        /// PDF files to index before the first question
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

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Index { files } => {
            let config = Config::load(&config_dir).context("Failed to load configuration")?;
            index_files(&config, &files)?;
        }
        Commands::Ask { files, question } => {
            let config = Config::load(&config_dir).context("Failed to load configuration")?;
            ask_question(&config, &files, &question)?;
        }
        Commands::Chat { files } => {
            let config = Config::load(&config_dir).context("Failed to load configuration")?;
            run_chat(&config, &files)?;
        }
    }

    Ok(())
}
