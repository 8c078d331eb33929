// ABOUTME: Entry point for the groundwork binary.
// ABOUTME: Parses CLI arguments, loads configuration, runs the research workflow, writes the report.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;

use groundwork_agent::client::GeminiClient;
use groundwork_agent::pipeline::ResearchPipeline;
use groundwork_core::config::ResearchConfig;
use groundwork_core::events::ConsoleObserver;

#[derive(Parser)]
#[command(
    name = "groundwork",
    version,
    about = "Multi-phase LLM research agent producing cited markdown reports"
)]
struct Cli {
    /// Research query. Read interactively from stdin when omitted.
    query: Option<String>,

    /// Pre-supplied answers to clarification questions, skipping the
    /// interactive prompt.
    #[arg(long)]
    clarification: Option<String>,

    /// Directory for the generated report (overrides GROUNDWORK_REPORTS_DIR).
    #[arg(long)]
    reports_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groundwork=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match ResearchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("\nPlease create a .env file with the required API keys.");
            eprintln!("See .env.example for a template.");
            std::process::exit(2);
        }
    };

    if let Some(dir) = cli.reports_dir {
        config.reports_dir = dir;
    }

    let query = match cli.query {
        Some(query) => query,
        None => prompt_for_query()?,
    };

    tracing::info!(model = %config.gemini_model, "starting research workflow");

    let client = GeminiClient::new(&config);
    let registry = groundwork_tools::default_registry(&config);
    let observer = ConsoleObserver;
    let pipeline = ResearchPipeline::new(&client, &registry, &config, &observer);

    let report = pipeline.run(&query, cli.clarification.as_deref()).await?;

    let path = write_report(&config.reports_dir, &report)?;
    println!("\nReport saved to: {}", path.display());

    Ok(())
}

fn prompt_for_query() -> anyhow::Result<String> {
    print!("Enter your research query: ");
    std::io::stdout().flush()?;

    let mut query = String::new();
    std::io::stdin().read_line(&mut query)?;
    let query = query.trim().to_string();

    if query.is_empty() {
        anyhow::bail!("no query provided");
    }
    Ok(query)
}

/// Write the report to a timestamped markdown file, creating the
/// directory if needed.
fn write_report(dir: &Path, report: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("report_{}.md", timestamp));
    std::fs::write(&path, report)?;

    Ok(path)
}
