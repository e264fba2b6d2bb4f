use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cysticcare::commands::{ask, run_chat, show_index_stats};
use cysticcare::config::{Config, get_config_dir, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cysticcare")]
#[command(about = "A chatbot that answers questions about Polycystic Kidney Disease")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.cysticcare)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question to answer
        question: String,
    },
    /// Build the knowledge base and report corpus statistics
    Index,
    /// Configure the corpus, Ollama and answer generation
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir().context("Could not determine the configuration directory")?,
    };

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&Config::load(&config_dir)?);
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Chat => {
            run_chat(&Config::load(&config_dir)?).await?;
        }
        Commands::Ask { question } => {
            ask(&Config::load(&config_dir)?, &question).await?;
        }
        Commands::Index => {
            show_index_stats(&Config::load(&config_dir)?).await?;
        }
    }

    Ok(())
}
