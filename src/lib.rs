//! Polk-Scraper: a polite veteran card harvester
//!
//! This crate walks the paginated veteran listing, visits every card's detail page,
//! extracts the biographical fields and saves the portrait image together with one
//! metadata row per saved image, stopping once the configured quota is reached.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Polk-Scraper operations
///
/// Only startup failures and local resource exhaustion ever leave
/// [`crawler::Coordinator::run`]; everything else is recovered per page or per card.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("No space left while writing {}", path.display())]
    StorageFull {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the fetch client once its retry budget is spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// Returns true for network-level failures worth another attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Polk-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Returns true when an IO error means the disk (or quota) is exhausted
pub(crate) fn is_storage_full(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::StorageFull
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, ListingCandidate, VeteranRecord};
pub use state::{CrawlPhase, StopReason};
pub use crate::url::extract_card_id;
