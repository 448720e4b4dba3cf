use crate::error::ScrapeError;
use crate::models::{Listing, ListingFields};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::debug;

pub const PRIMARY_CARD_SELECTOR: &str = "li[data-aut-id='itemBox']";
pub const FALLBACK_CARD_SELECTOR: &str = ".EIR5N";

const TITLE_SELECTOR: &str = "[data-aut-id='itemTitle']";
const PRICE_SELECTOR: &str = "[data-aut-id='itemPrice']";
const LOCATION_SELECTOR: &str = "[data-aut-id='item-location']";
const DATE_SELECTOR: &str = "[data-aut-id='item-date']";
const LINK_SELECTOR: &str = "a";
const IMAGE_SELECTOR: &str = "img";

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        error: format!("{:?}", e),
    })
}

/// One way of finding listing cards on a results page
pub trait CardLocator: Send + Sync {
    fn describe(&self) -> &str;

    /// Cards in document order
    fn locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// Card locator backed by a single CSS selector
pub struct CssCardLocator {
    source: String,
    selector: Selector,
}

impl CssCardLocator {
    pub fn new(selector: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            source: selector.to_string(),
            selector: parse_selector(selector)?,
        })
    }
}

impl CardLocator for CssCardLocator {
    fn describe(&self) -> &str {
        &self.source
    }

    fn locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

struct FieldSelectors {
    title: Selector,
    price: Selector,
    location: Selector,
    date_posted: Selector,
    link: Selector,
    image: Selector,
}

impl FieldSelectors {
    fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            title: parse_selector(TITLE_SELECTOR)?,
            price: parse_selector(PRICE_SELECTOR)?,
            location: parse_selector(LOCATION_SELECTOR)?,
            date_posted: parse_selector(DATE_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            image: parse_selector(IMAGE_SELECTOR)?,
        })
    }
}

/// Turns one results page into listings.
///
/// Card locators are tried in order until one matches anything. Every matched
/// card yields exactly one listing; fields are looked up independently so a
/// missing element only blanks that field.
pub struct ListingExtractor {
    base_url: String,
    card_locators: Vec<Box<dyn CardLocator>>,
    fields: FieldSelectors,
}

impl ListingExtractor {
    pub fn new(base_url: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            card_locators: vec![
                Box::new(CssCardLocator::new(PRIMARY_CARD_SELECTOR)?),
                Box::new(CssCardLocator::new(FALLBACK_CARD_SELECTOR)?),
            ],
            fields: FieldSelectors::new()?,
        })
    }

    /// Append a locator tried after the existing ones
    pub fn with_card_locator(mut self, locator: Box<dyn CardLocator>) -> Self {
        self.card_locators.push(locator);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn extract_listings(&self, document: &Html) -> Vec<Listing> {
        let Some((locator, cards)) = self.locate_cards(document) else {
            debug!("No listing cards matched any selector");
            return Vec::new();
        };

        debug!("Found {} cards with '{}'", cards.len(), locator.describe());

        cards
            .into_iter()
            .map(|card| self.extract_card(card))
            .collect()
    }

    pub fn extract_from_html(&self, html: &str) -> Vec<Listing> {
        self.extract_listings(&Html::parse_document(html))
    }

    fn locate_cards<'a>(
        &self,
        document: &'a Html,
    ) -> Option<(&dyn CardLocator, Vec<ElementRef<'a>>)> {
        self.card_locators.iter().find_map(|locator| {
            let cards = locator.locate(document);
            if cards.is_empty() {
                debug!("No cards matched '{}'", locator.describe());
                None
            } else {
                Some((locator.as_ref(), cards))
            }
        })
    }

    // Nested cards are not special: each lookup takes the card's first match
    fn extract_card(&self, card: ElementRef<'_>) -> Listing {
        let fields = ListingFields {
            title: text_of(card, &self.fields.title),
            price: text_of(card, &self.fields.price),
            location: text_of(card, &self.fields.location),
            date_posted: text_of(card, &self.fields.date_posted),
            link: attr_of(card, &self.fields.link, "href").map(|href| self.absolute_link(&href)),
            image_url: attr_of(card, &self.fields.image, "src"),
        };

        Listing::from(fields)
    }

    /// Prefix relative hrefs with the base URL; leading slash or not, the rule is the same
    pub fn absolute_link(&self, href: &str) -> String {
        if has_scheme(href) {
            href.to_string()
        } else {
            format!("{}{}", self.base_url, href)
        }
    }
}

fn has_scheme(href: &str) -> bool {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"))
        .is_match(href)
}

/// Trimmed text of the first element matching `selector`
fn text_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Raw attribute of the first element matching `selector`; later matches are not consulted
fn attr_of(card: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
