use crate::common_scraper::ProgressReporter;
use crate::error::ScrapeError;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io;
use std::path::Path;

/// Colored status lines for an interactive search run
pub struct ScraperTUI {
    pages_scraped: u32,
}

impl Default for ScraperTUI {
    fn default() -> Self {
        Self::new()
    }
}

impl ScraperTUI {
    pub fn new() -> Self {
        Self { pages_scraped: 0 }
    }

    pub fn show_header(&self, query: &str, max_pages: u32) {
        self.line(Color::White, &format!("OLX search: '{}' (up to {} pages)", query, max_pages));
    }

    fn line(&self, color: Color, text: &str) {
        let result = execute!(
            io::stdout(),
            SetForegroundColor(color),
            Print(format!("{}\n", text)),
            ResetColor
        );
        if let Err(e) = result {
            tracing::debug!("Failed to write status line: {}", e);
        }
    }
}

impl ProgressReporter for ScraperTUI {
    fn page_started(&mut self, page: u32, max_pages: u32, url: &str) {
        self.line(
            Color::White,
            &format!("⏳ Scraping page {}/{} - URL: {}", page, max_pages, url),
        );
    }

    fn page_scraped(&mut self, page: u32, found: usize, total: usize) {
        self.pages_scraped += 1;
        self.line(
            Color::Green,
            &format!("✓ Page {}: {} listings ({} total)", page, found, total),
        );
    }

    fn no_more_listings(&mut self, page: u32) {
        self.line(
            Color::DarkGrey,
            &format!("No more listings found on page {}. Stopping.", page),
        );
    }

    fn page_failed(&mut self, page: u32, error: &ScrapeError) {
        self.line(
            Color::Red,
            &format!("✗ Error scraping page {}: {}", page, error),
        );
    }

    fn finished(&mut self, total: usize) {
        self.line(
            Color::DarkGrey,
            &format!(
                "Collected {} listings from {} pages",
                total, self.pages_scraped
            ),
        );
    }

    fn no_results(&mut self) {
        self.line(Color::Yellow, "No listings found.");
    }

    fn saved(&mut self, count: usize, path: &Path) {
        self.line(
            Color::Green,
            &format!("💾 Saved {} listings to {}", count, path.display()),
        );
    }
}
