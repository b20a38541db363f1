
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;

use super::{Config, ConfigError, ProviderConfig};
use crate::embeddings::chunking::ChunkingConfig;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 PDF RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir)?;

    eprintln!("{}", style("Provider Configuration").bold().yellow());
    eprintln!("Configure the OpenAI-compatible endpoint used for embeddings and answers.");
    eprintln!();

    configure_provider(&mut config.provider)?;

    eprintln!();
    eprintln!("{}", style("Chunking Configuration").bold().yellow());
    configure_chunking(&mut config.chunking)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_provider_connection(&config.provider)? {
        eprintln!("{}", style("✓ Provider connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to the provider").yellow()
        );
        eprintln!("You can continue, but make sure the endpoint is reachable before indexing.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Provider Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.provider.base_url).cyan());
    eprintln!(
        "  Embedding Model: {}",
        style(&config.provider.embedding_model).cyan()
    );
    eprintln!(
        "  Embedding Dimension: {}",
        style(config.provider.embedding_dimension).cyan()
    );
    eprintln!(
        "  Completion Model: {}",
        style(&config.provider.completion_model).cyan()
    );
    eprintln!("  Batch Size: {}", style(config.provider.batch_size).cyan());
    eprintln!(
        "  Timeout: {}s, Attempts: {}",
        style(config.provider.timeout_seconds).cyan(),
        style(config.provider.retry_attempts).cyan()
    );
    match config.provider.api_key() {
        Some(_) => eprintln!(
            "  API Key: {} (from {})",
            style("set").green(),
            config.provider.api_key_env
        ),
        None => eprintln!(
            "  API Key: {} (export {})",
            style("missing").red(),
            config.provider.api_key_env
        ),
    }

    eprintln!();
    eprintln!("{}", style("Pipeline Settings:").bold().yellow());
    eprintln!(
        "  Chunk Size: {} chars, Overlap: {} chars",
        style(config.chunking.chunk_size).cyan(),
        style(config.chunking.overlap).cyan()
    );
    eprintln!("  Top-k: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Purge stale chunks on re-index: {}",
        style(config.indexing.purge_stale_chunks).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No usable configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

/// Output length of well-known OpenAI embedding models
fn known_embedding_dimension(model: &str) -> Option<usize> {
    match model.trim() {
        "text-embedding-3-large" => Some(3072),
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

/// Dimension offered at the prompt: the model's known size, else the configured one
fn default_dimension(model: &str, provider: &ProviderConfig) -> usize {
    known_embedding_dimension(model).unwrap_or(provider.embedding_dimension)
}

fn configure_provider(provider: &mut ProviderConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default(provider.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = ProviderConfig {
                base_url: input.clone(),
                ..ProviderConfig::default()
            };
            temp_config.endpoint_url()?;
            Ok(())
        })
        .interact_text()?;

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(provider.embedding_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    eprintln!(
        "{}",
        style(
            "The vector store is sized by the embedding dimension. It must equal the length \
             of the vectors this model returns, or every upload fails."
        )
        .dim()
    );
    let embedding_dimension: usize = Input::new()
        .with_prompt("Embedding dimension")
        .default(default_dimension(&embedding_model, provider))
        .interact_text()?;

    let completion_model: String = Input::new()
        .with_prompt("Completion model")
        .default(provider.completion_model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding requests")
        .default(provider.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 2048 {
                Err("Batch size must be 2048 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    provider.set_base_url(base_url)?;
    provider.set_embedding_model(embedding_model)?;
    provider.set_embedding_dimension(embedding_dimension)?;
    provider.set_completion_model(completion_model)?;
    provider.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_chunking(chunking: &mut ChunkingConfig) -> Result<()> {
    let chunk_size: usize = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(chunking.chunk_size)
        .interact_text()?;

    let overlap: usize = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(chunking.overlap)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input >= chunk_size {
                Err("Overlap must be smaller than the chunk size")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let candidate = ChunkingConfig {
        chunk_size,
        overlap,
    };
    candidate.validate()?;
    *chunking = candidate;

    Ok(())
}

fn test_provider_connection(provider: &ProviderConfig) -> Result<bool> {
    let url = provider.endpoint_url()?.join("models")?;

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    let mut request = agent.get(url.as_str());
    if let Some(key) = provider.api_key() {
        request = request.header("Authorization", format!("Bearer {}", key));
    }

    match request.call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::StatusCode(code)) if code == 401 || code == 403 => Ok(false),
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => Ok(true),
        Err(_) => Ok(false),
    }
}
