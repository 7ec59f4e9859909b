use serde::Deserialize;

/// Main configuration structure for Polk-Scraper
///
/// Every section and key is optional; the defaults reproduce the production crawl
/// against polkrf.ru.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Remote site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root used to resolve the listing template
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing path; `{page}` is replaced with the 1-based page number
    #[serde(rename = "listing-path-template")]
    pub listing_path_template: String,

    /// Image URL the site serves for cards without a portrait
    #[serde(rename = "placeholder-image-url")]
    pub placeholder_image_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://polkrf.ru".to_string(),
            listing_path_template: "/veterans?page={page}".to_string(),
            placeholder_image_url:
                "https://polkrf.ru/assets/index/img/veteran_card_placeholder.jpg".to_string(),
        }
    }
}

/// HTTP client identity, timeout and retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff step (milliseconds), doubled on every further retry
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff or Retry-After wait (milliseconds)
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 20_000,
            max_retries: 5,
            backoff_base_ms: 1_000,
            backoff_max_ms: 120_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/127.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "ru,en;q=0.9".to_string(),
        }
    }
}

/// Crawl pacing and termination
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Polite pause after every page fetch and every card attempt (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Number of saved images after which the crawl stops
    #[serde(rename = "max-items")]
    pub max_items: u32,

    /// Highest listing page to request; unbounded when absent
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Stop after this many listing pages in a row yielded no candidates
    #[serde(rename = "max-consecutive-empty-pages")]
    pub max_consecutive_empty_pages: Option<u32>,

    /// Skip cards whose image file already exists in the images directory
    #[serde(rename = "skip-existing-images")]
    pub skip_existing_images: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1_500,
            max_items: 1_000,
            max_pages: None,
            max_consecutive_empty_pages: None,
            skip_existing_images: false,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `<card id><ext>` image files
    #[serde(rename = "images-dir")]
    pub images_dir: String,

    /// Path of the CSV metadata table
    #[serde(rename = "metadata-path")]
    pub metadata_path: String,

    /// Prefix a freshly created metadata table with a UTF-8 byte order mark
    #[serde(rename = "utf8-bom")]
    pub utf8_bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            images_dir: "images".to_string(),
            metadata_path: "images/metadata.csv".to_string(),
            utf8_bom: false,
        }
    }
}

/// CSS selectors describing the listing and detail markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Card anchor on a listing page
    pub card: String,

    /// Portrait image inside a card anchor
    #[serde(rename = "card-image")]
    pub card_image: String,

    /// Element whose direct children carry the name parts
    pub title: String,

    /// One labelled field on the detail page
    #[serde(rename = "info-item")]
    pub info_item: String,

    #[serde(rename = "info-label")]
    pub info_label: String,

    #[serde(rename = "info-value")]
    pub info_value: String,

    #[serde(rename = "operations-list")]
    pub operations_list: String,

    /// Link inside the operations list, one per operation
    #[serde(rename = "operations-link")]
    pub operations_link: String,

    pub biography: String,

    #[serde(rename = "biography-paragraph")]
    pub biography_paragraph: String,

    /// Container whose direct children are the individual decorations
    pub decorations: String,

    #[serde(rename = "decoration-link")]
    pub decoration_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "a.b-veteran-card".to_string(),
            card_image: "img.b-veteran-card__img".to_string(),
            title: ".b-veteran-hero__title".to_string(),
            info_item: ".b-veteran-info__item".to_string(),
            info_label: ".b-veteran-info__label".to_string(),
            info_value: ".b-veteran-info__value".to_string(),
            operations_list: ".b-veteran-operations__list".to_string(),
            operations_link: "li a".to_string(),
            biography: ".b-veteran-biography".to_string(),
            biography_paragraph: "p".to_string(),
            decorations: ".b-veteran-rewards__slider".to_string(),
            decoration_link: "a".to_string(),
        }
    }
}
