//! Scrape one live page and dump the rendered records
//!
//! Run with: cargo run --example debug_scrape -p videoscrape-core -- [start] [limit]
//! Honours the same environment variables as the server (`CHROME_EXECUTABLE`, `SETTLE_MODE`, ...).

use videoscrape_core::{PageWindow, ScraperConfig, VideoScraper, build_page_url};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let window = PageWindow::new(args.next(), args.next());

    let config = ScraperConfig::from_env()?;
    println!("Fetching {}...\n", build_page_url(&config.upstream_url, &window));

    let scraper = VideoScraper::with_config(config);
    let records = scraper.scrape(&window).await?;

    if records.is_empty() {
        println!("No records found!");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
