//! Compiled CSS selectors for the listing and detail markup

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::Selector;

/// The configured selectors, parsed once at startup
#[derive(Debug, Clone)]
pub struct Selectors {
    pub card: Selector,
    pub card_image: Selector,
    pub title: Selector,
    pub info_item: Selector,
    pub info_label: Selector,
    pub info_value: Selector,
    pub operations_list: Selector,
    pub operations_link: Selector,
    pub biography: Selector,
    pub biography_paragraph: Selector,
    pub decorations: Selector,
    pub decoration_link: Selector,
}

impl Selectors {
    /// Parses every selector, naming the first one that fails
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            card: parse("card", &config.card)?,
            card_image: parse("card-image", &config.card_image)?,
            title: parse("title", &config.title)?,
            info_item: parse("info-item", &config.info_item)?,
            info_label: parse("info-label", &config.info_label)?,
            info_value: parse("info-value", &config.info_value)?,
            operations_list: parse("operations-list", &config.operations_list)?,
            operations_link: parse("operations-link", &config.operations_link)?,
            biography: parse("biography", &config.biography)?,
            biography_paragraph: parse("biography-paragraph", &config.biography_paragraph)?,
            decorations: parse("decorations", &config.decorations)?,
            decoration_link: parse("decoration-link", &config.decoration_link)?,
        })
    }
}

fn parse(name: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} = '{}': {:?}", name, css, e)))
}
