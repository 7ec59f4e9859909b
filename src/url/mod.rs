//! URL handling module for Polk-Scraper
//!
//! This module provides listing URL templating, resolution of relative card links
//! against the page they were found on, and card-id extraction from detail URLs.

mod card_id;
mod resolve;

pub use card_id::extract_card_id;
pub use resolve::resolve_link;

use url::Url;

/// Placeholder substituted with the page number in the listing template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Builds the absolute URL of a listing page
///
/// # Arguments
///
/// * `base_url` - The site root (e.g. `https://polkrf.ru`)
/// * `template` - A path template containing `{page}`
/// * `page` - The 1-based page number
///
/// # Examples
///
/// ```
/// use url::Url;
/// use polk_scraper::url::listing_url;
///
/// let base = Url::parse("https://polkrf.ru").unwrap();
/// let url = listing_url(&base, "/veterans?page={page}", 3).unwrap();
/// assert_eq!(url.as_str(), "https://polkrf.ru/veterans?page=3");
/// ```
pub fn listing_url(base_url: &Url, template: &str, page: u32) -> Result<Url, url::ParseError> {
    let path = template.replace(PAGE_PLACEHOLDER, &page.to_string());
    base_url.join(&path)
}
