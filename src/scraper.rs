use crate::common_scraper::{PageFetcher, ProgressReporter, ScrapingOptions, Sleeper};
use crate::error::ScrapeError;
use crate::models::{Listing, SearchQuery};
use crate::parser::ListingExtractor;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Blocking HTTP fetcher that sends the configured browser headers on every request
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(options: &ScrapingOptions) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .default_headers(build_header_map(&options.headers)?)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }
}

/// Converts configured header pairs into a `HeaderMap`.
///
/// `Accept-Encoding` is left to the client: reqwest only decompresses
/// gzip/deflate/br bodies when it negotiates the encoding itself, and it
/// advertises the same set.
pub fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap, ScrapeError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScrapeError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        if header_name == ACCEPT_ENCODING {
            debug!("Leaving Accept-Encoding '{}' to the HTTP client", value);
            continue;
        }
        let header_value = HeaderValue::from_str(value).map_err(|e| ScrapeError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ScrapeError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })
    }
}

/// Sleeps on the current thread while a spinner shows the remaining wait
pub struct SpinnerSleeper;

impl Sleeper for SpinnerSleeper {
    fn sleep(&mut self, duration: Duration) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!(
            "Waiting {:.1}s before the next page",
            duration.as_secs_f64()
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));
        std::thread::sleep(duration);
        spinner.finish_and_clear();
    }
}

/// Drives the page loop: fetch, extract, decide, pause.
pub struct Paginator<F, S, R> {
    fetcher: F,
    sleeper: S,
    rng: R,
    extractor: ListingExtractor,
    options: ScrapingOptions,
}

impl Paginator<HttpFetcher, SpinnerSleeper, StdRng> {
    /// Live paginator: real HTTP, real sleeps, entropy-seeded delays
    pub fn from_options(options: ScrapingOptions) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&options)?;
        Self::new(options, fetcher, SpinnerSleeper, StdRng::from_entropy())
    }
}

impl<F, S, R> Paginator<F, S, R>
where
    F: PageFetcher,
    S: Sleeper,
    R: Rng,
{
    pub fn new(
        options: ScrapingOptions,
        fetcher: F,
        sleeper: S,
        rng: R,
    ) -> Result<Self, ScrapeError> {
        options.validate()?;
        let extractor = ListingExtractor::new(&options.base_url)?;
        Ok(Self {
            fetcher,
            sleeper,
            rng,
            extractor,
            options,
        })
    }

    /// Listings from up to `max_pages` pages, in page order then document order.
    ///
    /// Stops at the first page without listings. A transport failure ends the
    /// loop and whatever earlier pages produced is returned.
    pub fn get_search_results(
        &mut self,
        query: &SearchQuery,
        max_pages: u32,
        reporter: &mut dyn ProgressReporter,
    ) -> Vec<Listing> {
        let mut all_listings = Vec::new();

        for page in 1..=max_pages {
            let url = self.options.search_url(query, page);
            reporter.page_started(page, max_pages, &url);

            let body = match self.fetcher.fetch(&url) {
                Ok(body) => body,
                Err(e) => {
                    warn!("Error scraping page {}: {}", page, e);
                    reporter.page_failed(page, &e);
                    break;
                }
            };

            let listings = self.extractor.extract_listings(&Html::parse_document(&body));
            if listings.is_empty() {
                info!("No more listings found on page {}, stopping", page);
                reporter.no_more_listings(page);
                break;
            }

            let found = listings.len();
            all_listings.extend(listings);
            reporter.page_scraped(page, found, all_listings.len());

            if page < max_pages {
                let delay = self.options.sample_delay(&mut self.rng);
                debug!("Sleeping {:?} before page {}", delay, page + 1);
                self.sleeper.sleep(delay);
            }
        }

        reporter.finished(all_listings.len());
        all_listings
    }
}
