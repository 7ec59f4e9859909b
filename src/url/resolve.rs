//! Resolution of card links against the listing page

use url::Url;

/// Resolves an `href`/`src` attribute against the page it was found on
///
/// Returns None if the link should be dropped:
/// - empty or whitespace-only values
/// - `javascript:`, `mailto:`, `tel:` and `data:` values
/// - values that do not resolve to an http(s) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" => {
            Some(absolute_url)
        }
        _ => None,
    }
}
