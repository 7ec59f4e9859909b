//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl state machine that drives:
//! - Page-by-page listing traversal
//! - Duplicate suppression by image URL
//! - Detail extraction and image materialization per card
//! - Metadata persistence and quota accounting
//! - Polite pacing between requests

use crate::config::{validate, Config, OutputConfig};
use crate::crawler::detail::{extract_detail, VeteranRecord};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::image::{existing_image, ImageMaterializer, Materialized};
use crate::crawler::listing::{extract_listing, ListingCandidate};
use crate::crawler::parser::Document;
use crate::crawler::scheduler::Pacer;
use crate::crawler::selectors::Selectors;
use crate::output::{CrawlReport, CsvMetadataSink, MetadataSink};
use crate::state::{CrawlPhase, Quota, SeenSet, StopReason};
use crate::url::{extract_card_id, listing_url};
use crate::{is_storage_full, ScrapeError};
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Main crawler coordinator structure
///
/// Owns every piece of per-run state: the seen set, the quota counter, the
/// metadata sink and the report. Nothing else writes to them.
pub struct Coordinator {
    config: Config,
    base_url: Url,
    /// Normalized placeholder portrait URL
    placeholder: Url,
    selectors: Selectors,
    fetcher: Fetcher,
    images: ImageMaterializer,
    sink: Box<dyn MetadataSink + Send>,
    pacer: Pacer,
    seen: SeenSet,
    quota: Quota,
    report: CrawlReport,
    /// Listing pages in a row that produced no candidates
    empty_streak: u32,
}

impl Coordinator {
    /// Creates a coordinator writing metadata to the configured CSV table
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Output directories exist and the client is built
    /// * `Err(ScrapeError)` - Invalid configuration or unusable output location
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let sink = CsvMetadataSink::new(&config.output.metadata_path, config.output.utf8_bom);
        Self::with_sink(config, Box::new(sink))
    }

    /// Creates a coordinator with a caller-supplied metadata sink
    pub fn with_sink(
        config: Config,
        sink: Box<dyn MetadataSink + Send>,
    ) -> Result<Self, ScrapeError> {
        validate(&config)?;

        let base_url = Url::parse(&config.site.base_url)?;
        let placeholder = Url::parse(&config.site.placeholder_image_url)?;
        let selectors = Selectors::compile(&config.selectors)?;
        let fetcher = Fetcher::new(&config.http)?;

        prepare_output(&config.output)?;

        Ok(Self {
            base_url,
            placeholder,
            selectors,
            fetcher,
            images: ImageMaterializer::new(&config.output.images_dir),
            sink,
            pacer: Pacer::from_millis(config.crawler.delay_ms),
            seen: SeenSet::new(),
            quota: Quota::new(config.crawler.max_items),
            report: CrawlReport::new(&config.output.images_dir, &config.output.metadata_path),
            empty_streak: 0,
            config,
        })
    }

    /// Runs the crawl until a terminal state is reached
    ///
    /// Page and card failures are logged and skipped. Only a full disk ends the
    /// run early with an error.
    pub async fn run(&mut self) -> Result<CrawlReport, ScrapeError> {
        tracing::info!(
            "Starting crawl of {} (quota: {} images)",
            self.base_url,
            self.quota.max()
        );

        let mut phase = CrawlPhase::Listing(1);
        let reason = loop {
            phase = match phase {
                CrawlPhase::Listing(page) => self.visit_listing(page).await,
                CrawlPhase::Processing {
                    page,
                    candidates,
                    index,
                } => self.process_next(page, candidates, index).await?,
                CrawlPhase::Done(reason) => break reason,
            };
        };

        self.report.pauses = self.pacer.pauses();
        self.report.finish(reason);

        tracing::info!(
            "Downloaded {} images to '{}' ({})",
            self.quota.saved(),
            self.images.images_dir().display(),
            reason
        );
        tracing::info!(
            "Appended {} metadata rows to '{}'",
            self.sink.rows_written(),
            self.config.output.metadata_path
        );

        Ok(self.report.clone())
    }

    /// The report as filled so far
    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    /// Fetches one listing page and moves to processing its candidates
    ///
    /// A failed fetch counts as a page that yielded nothing.
    async fn visit_listing(&mut self, page: u32) -> CrawlPhase {
        let url = match listing_url(&self.base_url, &self.config.site.listing_path_template, page)
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to build URL for page {}: {}", page, e);
                self.report.pages_failed += 1;
                self.empty_streak += 1;
                return self.advance(page).await;
            }
        };

        tracing::info!("Fetching page #{}: {}", page, url);
        self.report.pages_visited += 1;

        let response = match self.fetcher.fetch(url.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to process page {}: {}", page, e);
                self.report.pages_failed += 1;
                self.empty_streak += 1;
                return self.advance(page).await;
            }
        };

        // Links resolve against the final URL after redirects
        let page_url = Url::parse(&response.url).unwrap_or(url);
        let candidates = {
            let document = Document::parse(&response.body);
            extract_listing(&document, &page_url, &self.selectors, &self.placeholder)
        };

        tracing::info!("Found {} candidate images on page {}", candidates.len(), page);
        self.report.candidates_found += candidates.len() as u64;

        if candidates.is_empty() {
            self.empty_streak += 1;
        } else {
            self.empty_streak = 0;
        }

        CrawlPhase::Processing {
            page,
            candidates,
            index: 0,
        }
    }

    /// Handles the candidate at `index`, or leaves the page when none remain
    async fn process_next(
        &mut self,
        page: u32,
        candidates: Vec<ListingCandidate>,
        index: usize,
    ) -> Result<CrawlPhase, ScrapeError> {
        if self.quota.is_reached() {
            return Ok(CrawlPhase::Done(StopReason::QuotaReached));
        }

        let Some(candidate) = candidates.get(index) else {
            return Ok(self.advance(page).await);
        };

        if self.seen.contains(&candidate.image_url) {
            tracing::debug!("Duplicate image URL skipped: {}", candidate.image_url);
            self.report.duplicates += 1;
        } else {
            self.seen.insert(&candidate.image_url);
            if self.process_candidate(candidate).await? {
                self.pacer.pause().await;
            }
        }

        Ok(CrawlPhase::Processing {
            page,
            candidates,
            index: index + 1,
        })
    }

    /// Processes one unseen candidate
    ///
    /// Returns whether the attempt counts as a processed slot that must be
    /// followed by the polite delay.
    async fn process_candidate(&mut self, candidate: &ListingCandidate) -> Result<bool, ScrapeError> {
        let id = extract_card_id(&candidate.detail_url);
        if id.is_empty() {
            tracing::warn!(
                "No card id in detail URL {}, skipping image {}",
                candidate.detail_url,
                candidate.image_url
            );
            self.report.missing_ids += 1;
            return Ok(true);
        }

        if self.config.crawler.skip_existing_images {
            if let Some(path) = existing_image(self.images.images_dir(), &id) {
                tracing::debug!("Card {} already saved at {}", id, path.display());
                self.report.already_present += 1;
                return Ok(false);
            }
        }

        let record = self.fetch_detail(&candidate.detail_url, &id).await;

        match self
            .images
            .materialize(&self.fetcher, &candidate.image_url, &id)
            .await?
        {
            Materialized::Saved(_) => {
                self.quota.record_save();
                self.report.images_saved = self.quota.saved();
                tracing::debug!("Downloaded count: {}", self.quota.saved());
                self.persist(&record)?;
            }
            Materialized::Skipped(reason) => {
                tracing::debug!("Image for card {} skipped: {}", id, reason);
                self.report.record_skip(reason);
            }
        }

        Ok(true)
    }

    /// Fetches and extracts a detail page, degrading to an id-only record
    async fn fetch_detail(&mut self, detail_url: &str, id: &str) -> VeteranRecord {
        match self.fetcher.fetch(detail_url).await {
            Ok(response) => {
                let document = Document::parse(&response.body);
                extract_detail(&document, detail_url, &self.selectors)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch detail page {}: {}", detail_url, e);
                self.report.detail_failures += 1;
                VeteranRecord::with_id(id)
            }
        }
    }

    /// Appends the record; a failed row is logged unless the disk is full
    fn persist(&mut self, record: &VeteranRecord) -> Result<(), ScrapeError> {
        match self.sink.append(record) {
            Ok(()) => {
                self.report.metadata_rows += 1;
                Ok(())
            }
            Err(e) if e.is_storage_full() => Err(ScrapeError::StorageFull {
                path: PathBuf::from(&self.config.output.metadata_path),
                source: io::Error::new(io::ErrorKind::StorageFull, e),
            }),
            Err(e) => {
                tracing::error!("Failed to append metadata for card {}: {}", record.id, e);
                self.report.metadata_failures += 1;
                Ok(())
            }
        }
    }

    /// Leaves `page`: either stops or pauses and moves to the next listing page
    async fn advance(&mut self, page: u32) -> CrawlPhase {
        if self.quota.is_reached() {
            return CrawlPhase::Done(StopReason::QuotaReached);
        }

        if let Some(limit) = self.config.crawler.max_consecutive_empty_pages {
            if self.empty_streak >= limit {
                tracing::warn!(
                    "{} consecutive listing pages yielded nothing, stopping at page {}",
                    self.empty_streak,
                    page
                );
                return CrawlPhase::Done(StopReason::EmptyPages);
            }
        }

        if let Some(max_pages) = self.config.crawler.max_pages {
            if page >= max_pages {
                tracing::warn!(
                    "Reached page ceiling {} with {} of {} images saved",
                    max_pages,
                    self.quota.saved(),
                    self.quota.max()
                );
                return CrawlPhase::Done(StopReason::PageCeiling);
            }
        }

        self.pacer.pause().await;
        tracing::info!(
            "Proceeding to next page: {} (downloaded: {})",
            page + 1,
            self.quota.saved()
        );
        CrawlPhase::Listing(page + 1)
    }
}

/// Creates the images directory and the metadata table's parent directory
fn prepare_output(output: &OutputConfig) -> Result<(), ScrapeError> {
    let images_dir = Path::new(&output.images_dir);
    if !images_dir.is_dir() {
        std::fs::create_dir_all(images_dir).map_err(|e| output_error(images_dir, e))?;
        tracing::info!("Created images directory at '{}'", images_dir.display());
    }

    if let Some(parent) = Path::new(&output.metadata_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
        }
    }

    Ok(())
}

fn output_error(path: &Path, e: io::Error) -> ScrapeError {
    if is_storage_full(&e) {
        ScrapeError::StorageFull {
            path: path.to_path_buf(),
            source: e,
        }
    } else {
        ScrapeError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.output.images_dir = dir.path().join("img").display().to_string();
        config.output.metadata_path = dir.path().join("meta").join("m.csv").display().to_string();
        config
    }

    #[test]
    fn test_new_creates_output_dirs() {
        let dir = TempDir::new().unwrap();
        let coordinator = Coordinator::new(test_config(&dir)).unwrap();

        assert!(dir.path().join("img").is_dir());
        assert!(dir.path().join("meta").is_dir());
        assert_eq!(coordinator.report().images_saved, 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.crawler.max_items = 0;

        assert!(matches!(
            Coordinator::new(config),
            Err(ScrapeError::Config(_))
        ));
    }

    #[test]
    fn test_output_error_classification() {
        let full = output_error(Path::new("/x"), io::Error::from(io::ErrorKind::StorageFull));
        assert!(matches!(full, ScrapeError::StorageFull { .. }));

        let other = output_error(Path::new("/x"), io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(other, ScrapeError::Io(_)));
    }
}
