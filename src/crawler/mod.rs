//! Crawler module for listing traversal and card harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML document access and compiled selectors
//! - Listing and detail page extraction
//! - Image download and naming
//! - Polite pacing and overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod image;
mod listing;
mod parser;
mod scheduler;
mod selectors;

pub use coordinator::Coordinator;
pub use detail::{extract_detail, VeteranRecord, LIST_SEPARATOR, METADATA_HEADER};
pub use fetcher::{build_http_client, is_retryable_status, FetchResponse, Fetcher, RetryPolicy};
pub use image::{existing_image, infer_extension, ImageMaterializer, Materialized, SkipReason};
pub use listing::{extract_listing, ListingCandidate};
pub use parser::{normalize_whitespace, Document, Node};
pub use scheduler::Pacer;
pub use selectors::Selectors;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::ScrapeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and create output directories
/// 2. Build the HTTP client
/// 3. Walk listing pages from page 1
/// 4. Extract details and save images until the quota is met
/// 5. Return the run report
///
/// # Example
///
/// ```no_run
/// use polk_scraper::config::load_config;
/// use polk_scraper::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("polk.toml"))?;
/// let report = crawl(config).await?;
/// println!("saved {}", report.images_saved);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlReport, ScrapeError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
