//! Listing page extraction
//!
//! Turns one listing page into the ordered (image, detail) pairs the coordinator
//! works through. Malformed cards are skipped one at a time, never the whole page.

use crate::crawler::parser::Document;
use crate::crawler::selectors::Selectors;
use crate::url::resolve_link;
use url::Url;

/// One card found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    /// Absolute URL of the card's portrait
    pub image_url: String,
    /// Absolute URL of the card's detail page
    pub detail_url: String,
}

/// Extracts candidates from a listing page, in document order
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `page_url` - The URL the page was fetched from, used to resolve relative links
/// * `selectors` - Card and card-image selectors
/// * `placeholder_url` - Portraits resolving to this URL are skipped
pub fn extract_listing(
    document: &Document,
    page_url: &Url,
    selectors: &Selectors,
    placeholder_url: &Url,
) -> Vec<ListingCandidate> {
    let mut candidates = Vec::new();

    for card in document.select(&selectors.card) {
        let Some(detail_url) = card.attr("href").and_then(|href| resolve_link(href, page_url))
        else {
            tracing::debug!("Skipping card without usable link on {}", page_url);
            continue;
        };

        let Some(image) = card.select_first(&selectors.card_image) else {
            tracing::debug!("Skipping card without image: {}", detail_url);
            continue;
        };

        let src = image.attr("src").map(str::trim).unwrap_or_default();
        if src.is_empty() {
            tracing::debug!("Skipping image without src: {}", detail_url);
            continue;
        }

        let Some(image_url) = resolve_link(src, page_url) else {
            tracing::debug!("Skipping unresolvable image src '{}' on {}", src, detail_url);
            continue;
        };

        if &image_url == placeholder_url {
            tracing::debug!("Skipping placeholder image: {}", image_url);
            continue;
        }

        candidates.push(ListingCandidate {
            image_url: image_url.to_string(),
            detail_url: detail_url.to_string(),
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;

    const PLACEHOLDER: &str = "https://polkrf.ru/assets/index/img/veteran_card_placeholder.jpg";

    fn page_url() -> Url {
        Url::parse("https://polkrf.ru/veterans?page=1").unwrap()
    }

    fn extract(html: &str) -> Vec<ListingCandidate> {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        let placeholder = Url::parse(PLACEHOLDER).unwrap();
        extract_listing(&Document::parse_str(html), &page_url(), &selectors, &placeholder)
    }

    fn card(href: &str, src: &str) -> String {
        format!(
            r#"<a class="b-veteran-card" href="{href}"><img class="b-veteran-card__img" src="{src}"><span>Name</span></a>"#
        )
    }

    #[test]
    fn test_placeholder_excluded_order_kept() {
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            card("/veteran/ivanov-1", "/uploads/1.jpg"),
            card(
                "/veteran/petrov-2",
                "/assets/index/img/veteran_card_placeholder.jpg"
            ),
            card("/veteran/sidorov-3", "/uploads/3.jpg"),
        );

        let candidates = extract(&html);
        assert_eq!(
            candidates,
            vec![
                ListingCandidate {
                    image_url: "https://polkrf.ru/uploads/1.jpg".to_string(),
                    detail_url: "https://polkrf.ru/veteran/ivanov-1".to_string(),
                },
                ListingCandidate {
                    image_url: "https://polkrf.ru/uploads/3.jpg".to_string(),
                    detail_url: "https://polkrf.ru/veteran/sidorov-3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_absolute_placeholder_excluded() {
        let html = card("/veteran/a-1", PLACEHOLDER);
        assert!(extract(&html).is_empty());
    }

    #[test]
    fn test_placeholder_matched_after_normalization() {
        let selectors = Selectors::compile(&SelectorConfig::default()).unwrap();
        let placeholder =
            Url::parse("HTTPS://polkrf.ru:443/assets/index/img/veteran_card_placeholder.jpg")
                .unwrap();
        let html = format!(
            "{}{}",
            card("/veteran/a-1", "/assets/index/img/veteran_card_placeholder.jpg"),
            card("/veteran/b-2", "/u/2.jpg"),
        );

        let candidates =
            extract_listing(&Document::parse_str(&html), &page_url(), &selectors, &placeholder);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].image_url, "https://polkrf.ru/u/2.jpg");
    }

    #[test]
    fn test_missing_or_empty_href_skipped() {
        let html = format!(
            r#"<a class="b-veteran-card"><img class="b-veteran-card__img" src="/u/0.jpg"></a>{}{}"#,
            card("", "/u/1.jpg"),
            card("/veteran/ok-2", "/u/2.jpg"),
        );
        let candidates = extract(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].detail_url, "https://polkrf.ru/veteran/ok-2");
    }

    #[test]
    fn test_missing_image_or_src_skips_only_that_card() {
        let html = format!(
            r#"<a class="b-veteran-card" href="/veteran/no-img-1"><span>x</span></a>
               <a class="b-veteran-card" href="/veteran/no-src-2"><img class="b-veteran-card__img"></a>
               <a class="b-veteran-card" href="/veteran/blank-3"><img class="b-veteran-card__img" src="  "></a>
               {}"#,
            card("/veteran/good-4", "/u/4.webp"),
        );
        let candidates = extract(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].image_url, "https://polkrf.ru/u/4.webp");
    }

    #[test]
    fn test_other_images_ignored() {
        let html = r#"<a class="b-veteran-card" href="/veteran/x-9">
                <img class="avatar" src="/u/other.jpg">
                <img class="b-veteran-card__img" src="/u/9.jpg">
            </a>"#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].image_url, "https://polkrf.ru/u/9.jpg");
    }

    #[test]
    fn test_page_without_cards() {
        assert!(extract("<html><body><p>Ничего не найдено</p></body></html>").is_empty());
    }
}
