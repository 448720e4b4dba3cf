pub mod common_scraper;
pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod scraper;
pub mod tui;
pub mod utils;

pub use crate::common_scraper::{run_search, ScrapingOptions};
pub use crate::error::ScrapeError;
pub use crate::models::{Listing, SearchQuery, SearchResult, NOT_FOUND};
pub use crate::parser::ListingExtractor;
pub use crate::scraper::Paginator;
