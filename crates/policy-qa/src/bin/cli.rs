//! Terminal chat for a policy PDF
//!
//! Run with: cargo run -p policy-qa --bin policy-qa -- chat --pdf handbook.pdf

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use policy_qa::ingestion::IngestPipeline;
use policy_qa::providers::OpenAiClient;
use policy_qa::{AppConfig, DocumentLoad, Error, PolicyAssistant, Role, Session, Turn};

#[derive(Parser)]
#[command(name = "policy-qa", version, about = "Ask questions about an HR policy PDF")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a policy PDF and chat about it
    Chat {
        /// Policy document
        #[arg(long)]
        pdf: PathBuf,
        /// API key (defaults to OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Chat model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Extract and chunk a PDF without calling the model
    Chunks {
        /// Policy document
        #[arg(long)]
        pdf: PathBuf,
        /// Number of chunks to preview
        #[arg(long, default_value_t = 3)]
        show: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_qa=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Chat {
            pdf,
            api_key,
            model,
        } => {
            if let Some(key) = api_key {
                config.llm.api_key = Some(key);
            }
            if let Some(model) = model {
                config.llm.model = model;
            }
            chat(config, &pdf).await
        }
        Command::Chunks { pdf, show } => chunks(&config, &pdf, show),
    }
}

fn spinner(message: &'static str) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn render_turn(turn: &Turn) {
    let label = match turn.role {
        Role::User => style("You").bold().green(),
        _ => style("Assistant").bold().cyan(),
    };
    if turn.is_error {
        println!("{} {}\n", label, style(&turn.content).red());
    } else {
        println!("{} {}\n", label, turn.content);
    }
}

async fn load(session: &mut Session, pdf: &Path) -> anyhow::Result<bool> {
    let data = tokio::fs::read(pdf).await?;
    let bar = spinner("Processing document...")?;
    let outcome = session.load_document(&display_name(pdf), data).await;
    bar.finish_and_clear();

    match outcome {
        Ok(load) => {
            if let Some(doc) = session.document() {
                let verb = match load {
                    DocumentLoad::Processed => "processed successfully",
                    DocumentLoad::Cached => "unchanged",
                };
                println!(
                    "{}",
                    style(format!(
                        "Document {}! Extracted {} text segments from {}/{} pages. You can now ask questions.",
                        verb,
                        doc.chunk_count(),
                        doc.pages_with_text,
                        doc.total_pages
                    ))
                    .green()
                );
                if let Some(warning) = &doc.warning {
                    println!("{}", style(warning).yellow());
                }
            }
            Ok(true)
        }
        Err(e @ Error::NoExtractableText(_)) => {
            println!("{}", style(e.to_string()).red().bold());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn chat(config: AppConfig, pdf: &Path) -> anyhow::Result<()> {
    println!(
        "{}\n{}\n",
        style(format!("{} HR Policy Assistant", config.assistant.organization)).bold(),
        style(format!(
            "Ask questions about {}'s HR policies and get instant answers.",
            config.assistant.organization
        ))
        .dim()
    );

    if config.llm.api_key.is_none() {
        println!(
            "{}",
            style("Please provide your OpenAI API key (--api-key or OPENAI_API_KEY) to continue.")
                .yellow()
        );
        return Ok(());
    }

    let llm = Arc::new(OpenAiClient::from_config(&config.llm)?);
    let mut session = Session::new(PolicyAssistant::new(&config, llm));

    if !load(&mut session, pdf).await? {
        return Ok(());
    }
    println!(
        "{}\n",
        style("Commands: /history, /reload, /quit").dim()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(format!("{} ", style("›").bold()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                for turn in session.transcript().turns() {
                    render_turn(turn);
                }
            }
            "/reload" => {
                if let Err(e) = load(&mut session, pdf).await {
                    println!(
                        "{}\n",
                        style(format!("Could not reload {}: {}", pdf.display(), e)).red()
                    );
                }
            }
            question => {
                let bar = spinner("Thinking...")?;
                let outcome = session.ask(question).await;
                bar.finish_and_clear();

                match outcome {
                    Ok(_) => {
                        if let Some(turn) = session.transcript().last() {
                            render_turn(turn);
                        }
                    }
                    Err(e) => println!("{}\n", style(e.to_string()).yellow()),
                }
            }
        }
    }

    Ok(())
}

fn chunks(config: &AppConfig, pdf: &Path, show: usize) -> anyhow::Result<()> {
    let data = std::fs::read(pdf)?;
    let pipeline = IngestPipeline::new(&config.chunking);

    let doc = match pipeline.ingest(&display_name(pdf), &data) {
        Ok(doc) => doc,
        Err(e @ Error::NoExtractableText(_)) => {
            println!("{}", style(e.to_string()).red().bold());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}: {} pages ({} with text), {} chars, {} chunks",
        style(&doc.filename).bold(),
        doc.total_pages,
        doc.pages_with_text,
        doc.text.chars().count(),
        doc.chunk_count()
    );
    if let Some(warning) = &doc.warning {
        println!("{}", style(warning).yellow());
    }

    for (index, chunk) in doc.chunks.iter().take(show).enumerate() {
        let preview: String = chunk.chars().take(300).collect();
        println!(
            "\n{} ({} chars)\n{}",
            style(format!("[chunk {}]", index)).cyan(),
            chunk.chars().count(),
            preview.trim_end()
        );
    }

    Ok(())
}
