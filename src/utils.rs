use crate::models::{Listing, SearchQuery, SearchResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// `olx_<query>_<YYYYMMDD_HHMMSS>.<ext>`
pub fn output_filename(query: &SearchQuery, now: DateTime<Local>, format: OutputFormat) -> String {
    format!(
        "olx_{}_{}.{}",
        query.slug(),
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

pub fn save_to_json(result: &SearchResult, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create output file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Writes a header row plus one row per listing. Nothing is written for an empty slice.
pub fn save_to_csv(listings: &[Listing], output_path: &Path) -> Result<()> {
    if listings.is_empty() {
        return Ok(());
    }

    let file = File::create(output_path)
        .context(format!("Failed to create output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;

    Ok(())
}
