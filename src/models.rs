use chrono::{DateTime, Local};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Placeholder stored in a field that could not be extracted
pub const NOT_FOUND: &str = "N/A";

/// Format of `search_date` in the JSON output
pub const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scraped advertisement. Field order is the CSV column order.
///
/// Only built from [`ListingFields`], so every field is either real content
/// or [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    title: String,
    price: String,
    location: String,
    date_posted: String,
    link: String,
    image_url: String,
}

/// Raw per-field lookups for one card, before missing values become [`NOT_FOUND`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
}

fn or_not_found(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

impl From<ListingFields> for Listing {
    fn from(fields: ListingFields) -> Self {
        Listing {
            title: or_not_found(fields.title),
            price: or_not_found(fields.price),
            location: or_not_found(fields.location),
            date_posted: or_not_found(fields.date_posted),
            link: or_not_found(fields.link),
            image_url: or_not_found(fields.image_url),
        }
    }
}

impl Listing {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn date_posted(&self) -> &str {
        &self.date_posted
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }
}

/// A search term as typed by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    slug: String,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            slug: raw.replace(' ', "-"),
        }
    }

    /// Hyphenated form used in output filenames
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Percent-encoded form for the `q-<query>` path segment
    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.slug).into_owned()
    }
}

/// All listings of one run together with when the search happened
#[derive(Debug, Clone)]
pub struct SearchResult {
    search_date: DateTime<Local>,
    listings: Vec<Listing>,
}

impl SearchResult {
    pub fn new(search_date: DateTime<Local>, listings: Vec<Listing>) -> Self {
        Self {
            search_date,
            listings,
        }
    }

    pub fn total_results(&self) -> usize {
        self.listings.len()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }
}

// search_date is written as a plain local timestamp, not RFC 3339
impl Serialize for SearchResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("SearchResult", 3)?;
        state.serialize_field(
            "search_date",
            &self.search_date.format(SEARCH_DATE_FORMAT).to_string(),
        )?;
        state.serialize_field("total_results", &self.total_results())?;
        state.serialize_field("listings", &self.listings)?;
        state.end()
    }
}
