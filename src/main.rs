use anyhow::{Context, Result};
use clap::Parser;
use olxfinder::common_scraper::{run_search, ScrapingOptions, DEFAULT_BASE_URL};
use olxfinder::logging;
use olxfinder::models::SearchQuery;
use olxfinder::scraper::Paginator;
use olxfinder::tui::ScraperTUI;
use olxfinder::utils::OutputFormat;
use std::path::Path;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Scrape OLX search results into a JSON or CSV file")]
struct Args {
    /// Search query (spaces are replaced with hyphens)
    #[clap(short, long, default_value = "car-cover")]
    query: String,

    /// Maximum number of pages to scrape
    #[clap(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Output file format
    #[clap(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Marketplace root URL
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.debug);

    let query = SearchQuery::new(&args.query);
    let options = ScrapingOptions::default().with_base_url(&args.base_url);
    let mut paginator =
        Paginator::from_options(options).context("Failed to set up the scraper")?;

    let mut tui = ScraperTUI::new();
    tui.show_header(query.slug(), args.pages);

    run_search(
        &mut paginator,
        &query,
        args.pages,
        args.format,
        Path::new("."),
        &mut tui,
    )?;

    Ok(())
}
