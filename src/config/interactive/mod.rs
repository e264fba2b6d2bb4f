#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};

use super::{Config, ConfigError, OllamaConfig};
use crate::embeddings::OllamaEmbedder;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 CysticCare AI Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("Reference Documents").bold().yellow());
    configure_corpus(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embedding generation.");
    eprintln!();

    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Answer Generation").bold().yellow());
    configure_generation(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!(
            "{}",
            style("✓ Ollama connection successful and model available!").green()
        );
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not reach Ollama or the embedding model is missing").yellow()
        );
        eprintln!(
            "You can continue, but run `ollama pull {}` before chatting.",
            config.ollama.model
        );
    }

    if config.generation.api_key().is_err() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set. Add it to your environment or a .env file.",
                config.generation.api_key_env
            ))
            .yellow()
        );
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
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Corpus:").bold().yellow());
    eprintln!(
        "  Directory: {}",
        style(config.corpus.directory.display()).cyan()
    );
    eprintln!(
        "  Extensions: {}",
        style(config.corpus.extensions.join(", ")).cyan()
    );
    eprintln!(
        "  Chunk Length: {} words",
        style(config.chunking.chunk_length).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Neighbors (k): {}", style(config.retrieval.k).cyan());
    match config.retrieval.max_distance {
        Some(max) => eprintln!("  Max Distance: {}", style(max).cyan()),
        None => eprintln!("  Max Distance: {}", style("disabled").dim()),
    }

    eprintln!();
    eprintln!("{}", style("Answer Generation:").bold().yellow());
    eprintln!("  API Base: {}", style(&config.generation.api_base).cyan());
    eprintln!("  Model: {}", style(&config.generation.model).cyan());
    let key_state = if config.generation.api_key().is_ok() {
        style("set").green()
    } else {
        style("missing").red()
    };
    eprintln!(
        "  API Key ({}): {}",
        config.generation.api_key_env, key_state
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No valid existing configuration found. Using defaults.").yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_corpus(config: &mut Config) -> Result<()> {
    let directory: String = Input::new()
        .with_prompt("Directory containing reference documents")
        .default(config.corpus.directory.display().to_string())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Directory cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let chunk_length: usize = Input::new()
        .with_prompt("Words per chunk")
        .default(config.chunking.chunk_length)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if (1..=10_000).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidChunkLength(*input))
            }
        })
        .interact_text()?;

    let k: usize = Input::new()
        .with_prompt("Number of passages to retrieve per question")
        .default(config.retrieval.k)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidNeighborCount(*input))
            }
        })
        .interact_text()?;

    config.corpus.directory = PathBuf::from(directory.trim());
    config.chunking.chunk_length = chunk_length;
    config.retrieval.k = k;

    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    ollama.protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_port(port)?;
    ollama.set_host(host)?;
    ollama.set_model(model)?;

    Ok(())
}

fn configure_generation(config: &mut Config) -> Result<()> {
    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(config.generation.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    config.generation.model = model;
    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaEmbedder::new(ollama)
        .map(|embedder| {
            embedder
                .with_timeout(std::time::Duration::from_secs(5))
                .with_retry_attempts(1)
        })
        .and_then(|embedder| embedder.health_check())
        .is_ok()
}
