use olxfinder::common_scraper::{
    run_search, PageFetcher, ProgressReporter, ScrapingOptions, SilentReporter, Sleeper,
};
use olxfinder::utils::OutputFormat;
use olxfinder::{Paginator, ScrapeError, SearchQuery};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

/// Replays canned responses in order and records every requested URL
struct ScriptedFetcher {
    responses: RefCell<VecDeque<Result<String, ScrapeError>>>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<String, ScrapeError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl PageFetcher for &ScriptedFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.requested.borrow_mut().push(url.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {}", url))
    }
}

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Vec<Duration>,
}

impl Sleeper for &mut RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

#[derive(Default)]
struct RecordingReporter {
    failed_pages: Vec<u32>,
    empty_pages: Vec<u32>,
    no_results: usize,
    saved: usize,
}

impl ProgressReporter for RecordingReporter {
    fn page_failed(&mut self, page: u32, _error: &ScrapeError) {
        self.failed_pages.push(page);
    }

    fn no_more_listings(&mut self, page: u32) {
        self.empty_pages.push(page);
    }

    fn no_results(&mut self) {
        self.no_results += 1;
    }

    fn saved(&mut self, _count: usize, _path: &Path) {
        self.saved += 1;
    }
}

fn page_with(count: usize, page: u32) -> Result<String, ScrapeError> {
    let cards: String = (0..count)
        .map(|i| {
            format!(
                r#"<li data-aut-id="itemBox"><a href="/item/p{page}-{i}">
                    <span data-aut-id="itemTitle">Cover {page}-{i}</span>
                    <span data-aut-id="itemPrice">₹ 999</span>
                </a></li>"#
            )
        })
        .collect();
    Ok(format!("<html><body><ul>{}</ul></body></html>", cards))
}

fn http_error(url: &str) -> Result<String, ScrapeError> {
    Err(ScrapeError::Status {
        url: url.to_string(),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    })
}

fn options() -> ScrapingOptions {
    ScrapingOptions::default().with_base_url("https://olx.test")
}

#[test]
fn test_stops_at_first_empty_page() {
    let fetcher = ScriptedFetcher::new(vec![page_with(5, 1), page_with(5, 2), page_with(0, 3)]);
    let mut sleeper = RecordingSleeper::default();
    let mut reporter = RecordingReporter::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(1)).unwrap();

    let listings =
        paginator.get_search_results(&SearchQuery::new("car cover"), 3, &mut reporter);

    assert_eq!(listings.len(), 10);
    assert_eq!(listings[0].title(), "Cover 1-0");
    assert_eq!(listings[9].title(), "Cover 2-4");
    assert_eq!(
        *fetcher.requested.borrow(),
        vec![
            "https://olx.test/items/q-car-cover",
            "https://olx.test/items/q-car-cover?page=2",
            "https://olx.test/items/q-car-cover?page=3",
        ]
    );
    assert_eq!(reporter.empty_pages, vec![3]);
}

#[test]
fn test_empty_first_page_stops_immediately() {
    let fetcher = ScriptedFetcher::new(vec![page_with(0, 1)]);
    let mut sleeper = RecordingSleeper::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(2)).unwrap();

    let listings =
        paginator.get_search_results(&SearchQuery::new("nothing"), 5, &mut SilentReporter);

    assert!(listings.is_empty());
    assert_eq!(fetcher.requested.borrow().len(), 1);
    drop(paginator);
    assert!(sleeper.sleeps.is_empty());
}

#[test]
fn test_respects_max_pages() {
    let fetcher = ScriptedFetcher::new(vec![page_with(2, 1), page_with(2, 2)]);
    let mut sleeper = RecordingSleeper::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(3)).unwrap();

    let listings = paginator.get_search_results(&SearchQuery::new("q"), 2, &mut SilentReporter);

    assert_eq!(listings.len(), 4);
    assert_eq!(fetcher.requested.borrow().len(), 2);
}

#[test]
fn test_transport_failure_keeps_earlier_pages() {
    let fetcher = ScriptedFetcher::new(vec![
        page_with(3, 1),
        page_with(4, 2),
        http_error("https://olx.test/items/q-q?page=3"),
    ]);
    let mut sleeper = RecordingSleeper::default();
    let mut reporter = RecordingReporter::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(4)).unwrap();

    let listings = paginator.get_search_results(&SearchQuery::new("q"), 5, &mut reporter);

    assert_eq!(listings.len(), 7);
    assert_eq!(fetcher.requested.borrow().len(), 3);
    assert_eq!(reporter.failed_pages, vec![3]);
}

#[test]
fn test_transport_failure_on_first_page_returns_nothing() {
    let fetcher = ScriptedFetcher::new(vec![http_error("https://olx.test/items/q-q")]);
    let mut sleeper = RecordingSleeper::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(5)).unwrap();

    let listings = paginator.get_search_results(&SearchQuery::new("q"), 3, &mut SilentReporter);

    assert!(listings.is_empty());
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn test_sleeps_only_between_pages_within_delay_bounds() {
    let fetcher = ScriptedFetcher::new(vec![page_with(1, 1), page_with(1, 2), page_with(1, 3)]);
    let mut sleeper = RecordingSleeper::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(6)).unwrap();

    paginator.get_search_results(&SearchQuery::new("q"), 3, &mut SilentReporter);
    drop(paginator);

    assert_eq!(sleeper.sleeps.len(), 2);
    for delay in &sleeper.sleeps {
        assert!(*delay >= Duration::from_millis(1500));
        assert!(*delay <= Duration::from_millis(3500));
    }
}

#[test]
fn test_injected_fixed_delay() {
    let fetcher = ScriptedFetcher::new(vec![page_with(1, 1), page_with(1, 2)]);
    let mut sleeper = RecordingSleeper::default();
    let fixed = ScrapingOptions {
        min_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(10),
        ..options()
    };
    let mut paginator =
        Paginator::new(fixed, &fetcher, &mut sleeper, StdRng::seed_from_u64(7)).unwrap();

    paginator.get_search_results(&SearchQuery::new("q"), 2, &mut SilentReporter);
    drop(paginator);

    assert_eq!(sleeper.sleeps, vec![Duration::from_millis(10)]);
}

#[test]
fn test_reversed_delay_bounds_fail_construction() {
    let fetcher = ScriptedFetcher::new(vec![]);
    let mut sleeper = RecordingSleeper::default();
    let bad = ScrapingOptions {
        min_delay: Duration::from_secs(5),
        max_delay: Duration::from_secs(1),
        ..options()
    };

    let result = Paginator::new(bad, &fetcher, &mut sleeper, StdRng::seed_from_u64(8));

    assert!(matches!(result, Err(ScrapeError::InvalidDelay { .. })));
}

#[test]
fn test_run_search_writes_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![page_with(5, 1), page_with(5, 2), page_with(0, 3)]);
    let mut sleeper = RecordingSleeper::default();
    let mut reporter = RecordingReporter::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(9)).unwrap();

    let outcome = run_search(
        &mut paginator,
        &SearchQuery::new("car cover"),
        3,
        OutputFormat::Json,
        dir.path(),
        &mut reporter,
    )
    .unwrap();

    assert_eq!(outcome.listings_found, 10);
    let path = outcome.output_file.unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("olx_car-cover_"));
    assert!(name.ends_with(".json"));
    assert_eq!(fetcher.requested.borrow().len(), 3);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["total_results"], 10);
    assert_eq!(value["listings"].as_array().unwrap().len(), 10);
    assert_eq!(value["listings"][0]["link"], "https://olx.test/item/p1-0");
    assert_eq!(reporter.saved, 1);
    assert_eq!(reporter.no_results, 0);
}

#[test]
fn test_run_search_writes_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![page_with(2, 1)]);
    let mut sleeper = RecordingSleeper::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(10)).unwrap();

    let outcome = run_search(
        &mut paginator,
        &SearchQuery::new("q"),
        1,
        OutputFormat::Csv,
        dir.path(),
        &mut SilentReporter,
    )
    .unwrap();

    let content = std::fs::read_to_string(outcome.output_file.unwrap()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "title,price,location,date_posted,link,image_url");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Cover 1-0,"));
    assert!(lines[2].starts_with("Cover 1-1,"));
}

#[test]
fn test_run_search_without_listings_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![page_with(0, 1)]);
    let mut sleeper = RecordingSleeper::default();
    let mut reporter = RecordingReporter::default();
    let mut paginator =
        Paginator::new(options(), &fetcher, &mut sleeper, StdRng::seed_from_u64(11)).unwrap();

    let outcome = run_search(
        &mut paginator,
        &SearchQuery::new("q"),
        3,
        OutputFormat::Json,
        dir.path(),
        &mut reporter,
    )
    .unwrap();

    assert_eq!(outcome.listings_found, 0);
    assert!(outcome.output_file.is_none());
    assert_eq!(reporter.no_results, 1);
    assert_eq!(reporter.saved, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
