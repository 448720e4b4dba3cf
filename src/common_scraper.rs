use crate::error::ScrapeError;
use crate::models::{Listing, SearchQuery, SearchResult};
use crate::scraper::Paginator;
use crate::utils::{self, OutputFormat};
use anyhow::{Context, Result};
use chrono::Local;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.olx.in";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Everything a paginator needs besides the query itself
#[derive(Debug, Clone)]
pub struct ScrapingOptions {
    pub base_url: String,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub headers: Vec<(String, String)>,
}

impl Default for ScrapingOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(3500),
            headers: default_headers(),
        }
    }
}

fn default_headers() -> Vec<(String, String)> {
    [
        ("User-Agent", DEFAULT_USER_AGENT),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

impl ScrapingOptions {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.min_delay > self.max_delay {
            return Err(ScrapeError::InvalidDelay {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        Ok(())
    }

    /// Random pause in `[min_delay, max_delay]`
    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64();
        if max <= min {
            return self.min_delay;
        }
        Duration::from_secs_f64(rng.gen_range(min..=max))
    }

    /// Page 1 is the bare search URL, later pages add `?page=N`
    pub fn search_url(&self, query: &SearchQuery, page: u32) -> String {
        let url = format!("{}/items/q-{}", self.base_url, query.path_segment());
        if page > 1 {
            format!("{}?page={}", url, page)
        } else {
            url
        }
    }
}

/// Fetches the raw body of one page
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Blocks the current thread between page requests
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Operator-facing progress. Every method defaults to doing nothing.
pub trait ProgressReporter {
    fn page_started(&mut self, _page: u32, _max_pages: u32, _url: &str) {}
    fn page_scraped(&mut self, _page: u32, _found: usize, _total: usize) {}
    fn no_more_listings(&mut self, _page: u32) {}
    fn page_failed(&mut self, _page: u32, _error: &ScrapeError) {}
    fn finished(&mut self, _total: usize) {}
    fn no_results(&mut self) {}
    fn saved(&mut self, _count: usize, _path: &Path) {}
}

/// Reporter that discards everything
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Outcome of one full run
#[derive(Debug)]
pub struct ScrapingResult {
    pub listings_found: usize,
    pub output_file: Option<PathBuf>,
}

/// Paginate, then write the result file into `output_dir` if anything was found
pub fn run_search<F, S, R>(
    paginator: &mut Paginator<F, S, R>,
    query: &SearchQuery,
    max_pages: u32,
    format: OutputFormat,
    output_dir: &Path,
    reporter: &mut dyn ProgressReporter,
) -> Result<ScrapingResult>
where
    F: PageFetcher,
    S: Sleeper,
    R: Rng,
{
    let listings: Vec<Listing> = paginator.get_search_results(query, max_pages, reporter);

    if listings.is_empty() {
        reporter.no_results();
        return Ok(ScrapingResult {
            listings_found: 0,
            output_file: None,
        });
    }

    let now = Local::now();
    let result = SearchResult::new(now, listings);
    let path = output_dir.join(utils::output_filename(query, now, format));

    match format {
        OutputFormat::Json => utils::save_to_json(&result, &path),
        OutputFormat::Csv => utils::save_to_csv(result.listings(), &path),
    }
    .with_context(|| format!("Failed to save listings to {}", path.display()))?;

    reporter.saved(result.total_results(), &path);

    Ok(ScrapingResult {
        listings_found: result.total_results(),
        output_file: Some(path),
    })
}
