//! Run the extractor over a saved HTML file, no browser involved
//!
//! Run with: cargo run --example extract_file -p videoscrape-core -- page.html [document-url]

use videoscrape_core::extract_from_html;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: extract_file <page.html> [document-url]")?;
    let document_url = args.next();

    let html = std::fs::read_to_string(&path)?;
    let records = extract_from_html(&html, document_url.as_deref())?;

    println!("Found {} records in {}:\n", records.len(), path);
    for (i, record) in records.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, record.kind, record.title);
        println!("   Video: {}", record.video_url);
        println!("   Thumb: {}", record.thumbnail);
    }

    Ok(())
}
