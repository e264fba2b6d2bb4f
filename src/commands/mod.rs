
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use crate::assistant::{Assistant, ReplyOutcome};
use crate::config::Config;
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::generation::OpenAiClient;
use crate::knowledge::{KnowledgeBase, KnowledgeStats};

const GREETING: &str = "Hi! I can answer questions about Polycystic Kidney Disease. \
Type 'quit' to leave.";

const FAREWELL: &str = "Goodbye! Take care.";

/// Words that end the chat loop
#[inline]
pub fn is_exit_command(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "quit" | "exit" | "bye"
    )
}

/// Load the embedding model and the generator credential, failing fast on either
#[inline]
pub async fn open_assistant(config: &Config) -> Result<Assistant> {
    config.validate().context("Invalid configuration")?;

    let generator = OpenAiClient::from_env(&config.generation)
        .context("Answer generation is not configured")?;

    let ollama = config.ollama.clone();
    let embedder = tokio::task::spawn_blocking(move || OllamaEmbedder::connect(&ollama))
        .await
        .context("Embedding model check panicked")?
        .context("Failed to load the embedding model")?;

    Ok(Assistant::new(config, Arc::new(embedder), Arc::new(generator)))
}

/// Build the assistant's knowledge base behind a spinner
#[inline]
pub async fn initialize_with_progress(assistant: &Assistant) -> Result<Arc<KnowledgeBase>> {
    let bar = spinner("Reading and indexing reference documents")?;
    let result = assistant.initialize().await;
    bar.finish_and_clear();

    let knowledge = result.context("Failed to build the knowledge base")?;
    let stats = knowledge.stats();
    info!(
        "Knowledge base ready: {} documents ({} with text), {} chunks",
        stats.documents, stats.indexed_documents, stats.chunks
    );
    Ok(knowledge)
}

/// Interactive chat on stdin/stdout
#[inline]
pub async fn run_chat(config: &Config) -> Result<()> {
    let assistant = open_assistant(config).await?;
    initialize_with_progress(&assistant).await?;

    let mut stdout = tokio::io::stdout();
    let answered = chat_loop(&assistant, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    info!("Chat {} ended after {} questions", assistant.session(), answered);

    Ok(())
}

/// Read questions line by line and write the replies until EOF or an exit word.
///
/// Returns the number of questions answered.
#[inline]
pub async fn chat_loop<R, W>(assistant: &Assistant, reader: R, writer: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    writer.write_all(format!("{}\n\n", GREETING).as_bytes()).await?;

    loop {
        writer.write_all(b"You: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            writer.write_all(b"\n").await?;
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            writer.write_all(format!("{}\n", FAREWELL).as_bytes()).await?;
            break;
        }

        let reply = assistant.respond(question).await?;
        writer
            .write_all(format!("Bot: {}\n\n", reply.text).as_bytes())
            .await?;
        answered += 1;
    }

    writer.flush().await?;
    Ok(answered)
}

/// Answer a single question and print the reply
#[inline]
pub async fn ask(config: &Config, question: &str) -> Result<()> {
    let assistant = open_assistant(config).await?;
    initialize_with_progress(&assistant).await?;

    let reply = assistant.respond(question).await?;
    println!("{}", reply.text);

    match reply.outcome {
        ReplyOutcome::Answered => {}
        ReplyOutcome::OutOfDomain => {
            eprintln!("{}", style("Question is outside the reference documents").dim());
        }
        ReplyOutcome::RetrievalFailed | ReplyOutcome::GenerationFailed => {
            eprintln!(
                "{}",
                style("No answer could be produced, see the log for details").yellow()
            );
        }
    }

    Ok(())
}

/// Build the knowledge base without a generator and report what went into it
#[inline]
pub async fn show_index_stats(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let ollama = config.ollama.clone();
    let embedder = tokio::task::spawn_blocking(move || OllamaEmbedder::connect(&ollama))
        .await
        .context("Embedding model check panicked")?
        .context("Failed to load the embedding model")?;
    let model = embedder.model_name().to_string();

    let corpus = config.corpus.clone();
    let chunking = config.chunking;
    let embedder: Arc<dyn Embedder> = Arc::new(embedder);

    let bar = spinner("Reading and indexing reference documents")?;
    let started = chrono::Utc::now();
    let result = tokio::task::spawn_blocking(move || {
        KnowledgeBase::from_directory(&corpus, &chunking, embedder)
    })
    .await
    .context("Knowledge base build panicked")?;
    bar.finish_and_clear();

    let knowledge = result.context("Failed to build the knowledge base")?;
    let elapsed = chrono::Utc::now().signed_duration_since(started);

    print_stats(config, &model, &knowledge.stats(), elapsed.num_milliseconds());
    Ok(())
}

fn print_stats(config: &Config, model: &str, stats: &KnowledgeStats, elapsed_ms: i64) {
    println!("📚 Knowledge Base");
    println!("{}", "=".repeat(50));
    println!("   Directory: {}", config.corpus.directory.display());
    println!(
        "   Documents: {} ({} with extractable text)",
        stats.documents, stats.indexed_documents
    );
    println!(
        "   Chunks: {} ({} words each)",
        stats.chunks, config.chunking.chunk_length
    );
    println!("   Embedding Model: {}", model);
    println!("   Dimension: {}", stats.dimension);
    println!("   Build Time: {} ms", elapsed_ms);
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .context("Invalid progress template")?,
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}
