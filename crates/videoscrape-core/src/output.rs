//! JSON dump of scraped records

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::VideoRecord;

/// Default file name for the one-shot dump
pub const DEFAULT_OUTPUT_FILE: &str = "videos.json";

/// Write records as pretty-printed JSON (two-space indent), replacing any existing file
///
/// # Errors
/// - `Serialize` if encoding fails
/// - `Io` if the file cannot be written
pub async fn save_records(path: impl AsRef<Path>, records: &[VideoRecord]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), count = records.len(), "records saved");
    Ok(())
}
