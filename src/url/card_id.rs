//! Card id extraction from detail page URLs

use url::Url;

/// Extracts the card id from a detail page URL
///
/// The id is the last hyphen-delimited run of the final path segment, provided it
/// consists of ASCII digits only. Query strings, fragments and a trailing slash are
/// ignored. Anything else yields an empty string.
///
/// # Examples
///
/// ```
/// use polk_scraper::url::extract_card_id;
///
/// assert_eq!(extract_card_id("https://polkrf.ru/veteran/ivanov-ivan-12345"), "12345");
/// assert_eq!(extract_card_id("https://polkrf.ru/veteran/unknown"), "");
/// ```
pub fn extract_card_id(detail_url: &str) -> String {
    let path = match Url::parse(detail_url) {
        Ok(url) => url.path().to_string(),
        // Relative or malformed input: strip query and fragment by hand
        Err(_) => detail_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let last_run = segment.rsplit('-').next().unwrap_or_default();

    if !last_run.is_empty() && last_run.chars().all(|c| c.is_ascii_digit()) {
        last_run.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_number() {
        assert_eq!(extract_card_id("https://polkrf.ru/veteran/ivanov-ivan-12345"), "12345");
    }

    #[test]
    fn test_no_trailing_digits() {
        assert_eq!(extract_card_id("https://polkrf.ru/veteran/unknown"), "");
    }

    #[test]
    fn test_digits_not_last_run() {
        assert_eq!(extract_card_id("https://polkrf.ru/veteran/12345-ivanov"), "");
    }

    #[test]
    fn test_mixed_run_rejected() {
        assert_eq!(extract_card_id("https://polkrf.ru/veteran/ivanov-12a45"), "");
    }

    #[test]
    fn test_trailing_slash_and_query() {
        assert_eq!(
            extract_card_id("https://polkrf.ru/veteran/petrov-petr-987/?from=list#top"),
            "987"
        );
    }

    #[test]
    fn test_bare_numeric_segment() {
        assert_eq!(extract_card_id("https://polkrf.ru/veteran/4242"), "4242");
    }

    #[test]
    fn test_cyrillic_slug() {
        assert_eq!(
            extract_card_id("https://polkrf.ru/veteran/%D0%B8%D0%B2%D0%B0%D0%BD%D0%BE%D0%B2-555"),
            "555"
        );
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(extract_card_id("/veteran/sidorov-31?x=1"), "31");
    }

    #[test]
    fn test_root_url() {
        assert_eq!(extract_card_id("https://polkrf.ru/"), "");
        assert_eq!(extract_card_id(""), "");
    }
}
