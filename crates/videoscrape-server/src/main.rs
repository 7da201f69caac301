use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use videoscrape_core::{DEFAULT_OUTPUT_FILE, PageWindow, ScraperConfig, VideoScraper, save_records};
use videoscrape_server::{ServerConfig, ServerError, serve};

#[derive(Debug, Parser)]
#[command(name = "videoscrape", version, about = "Headless-browser video scraper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Scrape one page and write the records to a JSON file
    Scrape {
        /// Offset forwarded verbatim to the upstream listing
        #[arg(long, allow_hyphen_values = true)]
        start: Option<String>,
        /// Page size forwarded verbatim to the upstream listing
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,
        #[arg(long, short, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "videoscrape failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let scraper = VideoScraper::with_config(ScraperConfig::from_env()?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(ServerConfig::from_env()?, scraper).await,
        Command::Scrape {
            start,
            limit,
            output,
        } => {
            let records = scraper.scrape(&PageWindow::new(start, limit)).await?;
            save_records(&output, &records).await?;
            tracing::info!(count = records.len(), path = %output.display(), "one-shot scrape complete");
            Ok(())
        }
    }
}
