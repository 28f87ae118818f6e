use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use brochure_client::{HtmlPageParser, OpenAiClient, ReqwestFetcher};
use brochure_core::config::{FetchConfig, LlmConfig};
use brochure_core::models::{BrochureRequest, Tone};
use brochure_core::{BrochureService, TracingNotifier};

type Service = BrochureService<ReqwestFetcher, HtmlPageParser, OpenAiClient, TracingNotifier>;

#[derive(Parser)]
#[command(name = "brochure", version, about = "AI company brochure generator")]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LlmArgs {
    /// LLM model to use (e.g., "gemini-1.5-flash", "gpt-4o-mini")
    #[arg(short, long, global = true, env = "BROCHURE_MODEL")]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(short, long, global = true, env = "BROCHURE_BASE_URL")]
    base_url: Option<String>,

    /// API key (reads BROCHURE_API_KEY, then GEMINI_API_KEY, if not provided)
    #[arg(short, long, global = true, env = "BROCHURE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-page fetch timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    fetch_timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Markdown brochure for a company and stream it to stdout
    Generate {
        /// Company name
        #[arg(short, long)]
        company: String,

        /// Company landing page URL
        #[arg(short, long)]
        url: String,

        /// Writing tone (e.g., "professional", "humorous")
        #[arg(short, long, default_value = "professional")]
        tone: Tone,
    },

    /// Show the links the model considers relevant for a brochure
    Links {
        /// Company landing page URL
        #[arg(short, long)]
        url: String,
    },

    /// Print the aggregated website content the brochure would be written from
    Scrape {
        /// Company landing page URL
        #[arg(short, long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("brochure=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(cli.llm)?;

    match cli.command {
        Commands::Generate { company, url, tone } => cmd_generate(&service, company, url, tone).await,
        Commands::Links { url } => cmd_links(&service, &url).await,
        Commands::Scrape { url } => cmd_scrape(&service, &url).await,
    }
}

/// Build configuration and clients once, before any pipeline work.
fn build_service(args: LlmArgs) -> Result<Service> {
    let llm_config = LlmConfig::from_env_with_api_key(args.api_key)
        .map_err(|e| anyhow::anyhow!(e))?
        .with_overrides(args.model, args.base_url, None);

    let mut fetch_config = FetchConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    if let Some(secs) = args.fetch_timeout {
        fetch_config.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(config = ?llm_config, "LLM configuration loaded");

    let fetcher = ReqwestFetcher::with_config(&fetch_config).context("Failed to create HTTP client")?;
    let model = OpenAiClient::new(&llm_config).context("Failed to create LLM client")?;

    Ok(BrochureService::new(
        fetcher,
        HtmlPageParser::new(),
        model,
        TracingNotifier,
    ))
}

async fn cmd_generate(service: &Service, company: String, url: String, tone: Tone) -> Result<()> {
    let request = BrochureRequest::new(company, url, tone);
    let mut stream = service
        .run(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut stdout = std::io::stdout().lock();
    while let Some(fragment) = stream.next().await {
        stdout.write_all(fragment.as_bytes())?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    match stream.error() {
        Some(e) => tracing::error!(fragments = stream.fragments(), "Brochure is incomplete: {}", e),
        None => tracing::info!(fragments = stream.fragments(), "Brochure complete"),
    }

    Ok(())
}

async fn cmd_links(service: &Service, url: &str) -> Result<()> {
    let links = service
        .relevant_links(url)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("{}", serde_json::to_string_pretty(&links)?);

    Ok(())
}

async fn cmd_scrape(service: &Service, url: &str) -> Result<()> {
    let document = service.aggregate(url).await.map_err(|e| anyhow::anyhow!(e))?;

    print!("{}", document.render());

    Ok(())
}
