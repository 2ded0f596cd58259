use std::path::PathBuf;

use anyhow::Context;
use ai_llm_service::telemetry::{self, TARGET_PREFIX};
use api::AppState;
use assistant::ChatSession;
use clap::{Parser, Subcommand};
use doc_ingest::{
    UploadMetadata, ingest_paths,
    progress::{IndicatifProgress, Progress},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{
    Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";
const CHAT_PROMPT: &str = "Ask a financial question (or 'exit' to quit): ";

#[derive(Parser, Debug)]
#[command(name = "finwise", version, about = "Financial document assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Load documents into the vector store.
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Ask questions from the terminal.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment is used as is.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter("info"))
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| {
                    !meta.target().starts_with(TARGET_PREFIX)
                })),
        )
        .with(telemetry::layer())
        .init();

    let cli = Cli::parse();
    let state = AppState::from_env().context("failed to initialize FinWise")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr =
                std::env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());
            api::start(state, &addr).await?;
        }
        Command::Ingest {
            files,
            source,
            company,
            year,
        } => {
            let meta = UploadMetadata {
                source,
                company,
                year,
            };
            let progress = IndicatifProgress::spinner();
            let report = ingest_paths(
                state.store.as_ref(),
                &files,
                &meta,
                &state.ingest,
                &progress,
            )
            .await;
            progress.finish(&format!("{} file(s) processed", files.len()));

            println!(
                "Successfully ingested {} document chunks",
                report.chunks_stored
            );
            for failure in &report.failures {
                eprintln!("Error processing {}: {}", failure.file, failure.error);
            }
        }
        Command::Chat => chat_loop(&state).await?,
    }

    Ok(())
}

async fn chat_loop(state: &AppState) -> anyhow::Result<()> {
    let mut session = ChatSession::new("cli");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(CHAT_PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if is_exit(question) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let answer = state.assistant.respond(&mut session, question).await;
        println!("\n{}\n", answer.text);
    }
    Ok(())
}

fn is_exit(input: &str) -> bool {
    ["exit", "quit", "q"]
        .iter()
        .any(|word| input.eq_ignore_ascii_case(word))
}
